//! Reciter catalog types from the mp3quran API

use serde::Deserialize;

/// A reciter (qari) with their available recitation editions.
#[derive(Clone, Debug, Deserialize)]
pub struct Reciter {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub letter: String,
    #[serde(default)]
    pub moshaf: Vec<Moshaf>,
}

impl Reciter {
    /// Auto-select the moshaf to play for this reciter.
    ///
    /// Murattal (measured recitation) editions are preferred; otherwise the
    /// first listed edition is used.
    pub fn default_moshaf(&self) -> Option<&Moshaf> {
        self.moshaf
            .iter()
            .find(|m| m.name.to_lowercase().contains("murattal"))
            .or_else(|| self.moshaf.first())
    }
}

/// A recorded recitation edition with its own audio server.
#[derive(Clone, Debug, Deserialize)]
pub struct Moshaf {
    pub id: u32,
    pub name: String,
    pub server: String,
    #[serde(default)]
    pub surah_total: u16,
    #[serde(default)]
    pub moshaf_type: u32,
    /// Comma-separated surah numbers available on this server.
    #[serde(default)]
    pub surah_list: String,
}

impl Moshaf {
    pub fn surah_numbers(&self) -> Vec<u16> {
        self.surah_list
            .split(',')
            .filter_map(|s| s.trim().parse::<u16>().ok())
            .collect()
    }

    pub fn has_surah(&self, surah: u16) -> bool {
        self.surah_numbers().contains(&surah)
    }
}

/// One entry of the surah name index.
#[derive(Clone, Debug, Deserialize)]
pub struct SurahInfo {
    pub id: u16,
    pub name: String,
    /// 1 for Meccan, 0 for Medinan.
    #[serde(default)]
    pub makkia: u8,
}

#[derive(Debug, Deserialize)]
pub struct RecitersResponse {
    pub reciters: Vec<Reciter>,
}

#[derive(Debug, Deserialize)]
pub struct SuwarResponse {
    pub suwar: Vec<SurahInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moshaf(id: u32, name: &str, surah_list: &str) -> Moshaf {
        Moshaf {
            id,
            name: name.to_string(),
            server: "https://server.example/base".to_string(),
            surah_total: 114,
            moshaf_type: 11,
            surah_list: surah_list.to_string(),
        }
    }

    #[test]
    fn default_moshaf_prefers_murattal() {
        let reciter = Reciter {
            id: 1,
            name: "Test".to_string(),
            letter: "t".to_string(),
            moshaf: vec![
                moshaf(1, "Mujawwad - Hafs", "1,2"),
                moshaf(2, "Murattal - Hafs", "1,2,3"),
            ],
        };
        assert_eq!(reciter.default_moshaf().unwrap().id, 2);
    }

    #[test]
    fn default_moshaf_falls_back_to_first() {
        let reciter = Reciter {
            id: 1,
            name: "Test".to_string(),
            letter: "t".to_string(),
            moshaf: vec![moshaf(7, "Mujawwad - Hafs", "1"), moshaf(8, "Warsh", "1")],
        };
        assert_eq!(reciter.default_moshaf().unwrap().id, 7);
    }

    #[test]
    fn default_moshaf_is_none_without_editions() {
        let reciter = Reciter {
            id: 1,
            name: "Test".to_string(),
            letter: "t".to_string(),
            moshaf: vec![],
        };
        assert!(reciter.default_moshaf().is_none());
    }

    #[test]
    fn surah_list_parses_and_ignores_garbage() {
        let m = moshaf(1, "Murattal", "1,2, 3,abc,114");
        assert_eq!(m.surah_numbers(), vec![1, 2, 3, 114]);
        assert!(m.has_surah(114));
        assert!(!m.has_surah(4));
    }

    #[test]
    fn reciter_deserializes_from_api_payload() {
        let json = r#"{
            "id": 54,
            "name": "AbdulBaset AbdulSamad",
            "letter": "A",
            "moshaf": [{
                "id": 97,
                "name": "Murattal - Hafs A'n Assem",
                "server": "https://server7.mp3quran.net/basit",
                "surah_total": 114,
                "moshaf_type": 11,
                "surah_list": "1,2,3"
            }]
        }"#;
        let reciter: Reciter = serde_json::from_str(json).unwrap();
        assert_eq!(reciter.id, 54);
        assert_eq!(reciter.moshaf.len(), 1);
        assert_eq!(
            reciter.moshaf[0].server,
            "https://server7.mp3quran.net/basit"
        );
    }
}
