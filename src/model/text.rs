//! Surah text loading for the reading panel

use std::path::Path;

/// Directory holding one plain-text file per surah (`001.txt` .. `114.txt`).
pub const TEXT_DIR: &str = "assets/text";

/// Embedded fallback shown when a text asset is missing or empty.
const PLACEHOLDER_TEXT: &str = "\
بِسْمِ اللَّهِ الرَّحْمَـٰنِ الرَّحِيمِ (1) \
الْحَمْدُ لِلَّهِ رَبِّ الْعَالَمِينَ (2) \
الرَّحْمَـٰنِ الرَّحِيمِ (3) \
مَالِكِ يَوْمِ الدِّينِ (4) \
إِيَّاكَ نَعْبُدُ وَإِيَّاكَ نَسْتَعِينُ (5) \
اهْدِنَا الصِّرَاطَ الْمُسْتَقِيمَ (6) \
صِرَاطَ الَّذِينَ أَنْعَمْتَ عَلَيْهِمْ غَيْرِ الْمَغْضُوبِ عَلَيْهِمْ وَلَا الضَّالِّينَ (7)";

/// Text of one surah, split into display verses.
#[derive(Clone, Debug)]
pub struct SurahText {
    pub surah: u16,
    pub verses: Vec<String>,
    pub from_placeholder: bool,
}

impl SurahText {
    /// Load the text asset for a surah, falling back to the embedded
    /// placeholder so the reading panel is never blank.
    pub async fn load(surah: u16) -> Self {
        Self::load_from(Path::new(TEXT_DIR), surah).await
    }

    pub async fn load_from(dir: &Path, surah: u16) -> Self {
        let path = dir.join(format!("{:03}.txt", surah));
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) if !raw.trim().is_empty() => Self {
                surah,
                verses: split_verses(&raw),
                from_placeholder: false,
            },
            Ok(_) => {
                tracing::debug!(surah, path = %path.display(), "empty surah text asset, using placeholder");
                Self::placeholder(surah)
            }
            Err(e) => {
                tracing::debug!(surah, path = %path.display(), error = %e, "no surah text asset, using placeholder");
                Self::placeholder(surah)
            }
        }
    }

    pub fn placeholder(surah: u16) -> Self {
        Self {
            surah,
            verses: split_verses(PLACEHOLDER_TEXT),
            from_placeholder: true,
        }
    }
}

/// Split surah text on end-of-ayah markers: `(N)` or `﴿N﴾`, with ASCII or
/// Arabic-Indic digits. Best-effort only — text without markers stays one
/// block; proper segmentation needs a structured per-ayah source.
pub fn split_verses(raw: &str) -> Vec<String> {
    let mut verses = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        let close = match c {
            '(' => ')',
            '﴿' => '﴾',
            _ => {
                current.push(c);
                continue;
            }
        };

        // Lookahead for digits up to the matching close marker.
        let mut marker = String::new();
        let mut matched = false;
        while let Some(&next) = chars.peek() {
            if next == close && !marker.is_empty() {
                chars.next();
                matched = true;
                break;
            }
            if next.is_ascii_digit() || ('\u{0660}'..='\u{0669}').contains(&next) {
                marker.push(next);
                chars.next();
            } else {
                break;
            }
        }

        if matched {
            current.push(c);
            current.push_str(&marker);
            current.push(close);
            let verse = current.trim().to_string();
            if !verse.is_empty() {
                verses.push(verse);
            }
            current.clear();
        } else {
            current.push(c);
            current.push_str(&marker);
        }
    }

    let rest = current.trim();
    if !rest.is_empty() {
        verses.push(rest.to_string());
    }
    if verses.is_empty() && !raw.trim().is_empty() {
        verses.push(raw.trim().to_string());
    }
    verses
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_parenthesized_numbers() {
        let verses = split_verses("first verse (1) second verse (2) third (3)");
        assert_eq!(verses.len(), 3);
        assert_eq!(verses[0], "first verse (1)");
        assert_eq!(verses[2], "third (3)");
    }

    #[test]
    fn splits_on_ornate_ayah_markers() {
        let verses = split_verses("آية أولى ﴿١﴾ آية ثانية ﴿٢﴾");
        assert_eq!(verses.len(), 2);
        assert!(verses[0].ends_with("﴿١﴾"));
    }

    #[test]
    fn text_without_markers_stays_one_block() {
        let verses = split_verses("plain text with (parenthetical) remarks");
        assert_eq!(verses.len(), 1);
    }

    #[test]
    fn placeholder_has_seven_verses() {
        let text = SurahText::placeholder(1);
        assert!(text.from_placeholder);
        assert_eq!(text.verses.len(), 7);
    }

    #[tokio::test]
    async fn missing_asset_falls_back_to_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let text = SurahText::load_from(dir.path(), 2).await;
        assert!(text.from_placeholder);
        assert_eq!(text.surah, 2);
    }

    #[tokio::test]
    async fn asset_file_is_loaded_and_split() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("002.txt"), "alif lam mim (1) that book (2)").unwrap();
        let text = SurahText::load_from(dir.path(), 2).await;
        assert!(!text.from_placeholder);
        assert_eq!(text.verses.len(), 2);
    }
}
