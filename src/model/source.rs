//! Audio source URL resolution

use anyhow::{Result, bail};

/// Number of surahs in the Quran; audio servers host one file per surah.
pub const SURAH_COUNT: u16 = 114;

/// Resolve the audio file URL for a surah on a moshaf server.
///
/// Servers host files as zero-padded three-digit names (`001.mp3` ..
/// `114.mp3`). The server base must carry an http(s) scheme; a trailing
/// slash is tolerated.
pub fn resolve_audio_url(server: &str, surah: u16) -> Result<String> {
    if surah == 0 || surah > SURAH_COUNT {
        bail!("surah number out of range: {}", surah);
    }

    let base = server.trim().trim_end_matches('/');
    if !base.starts_with("https://") && !base.starts_with("http://") {
        bail!("unrecognized server URL scheme: {}", server);
    }

    Ok(format!("{}/{:03}.mp3", base, surah))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_surah_numbers_to_three_digits() {
        assert_eq!(
            resolve_audio_url("https://server6.mp3quran.net/akdr", 1).unwrap(),
            "https://server6.mp3quran.net/akdr/001.mp3"
        );
        assert_eq!(
            resolve_audio_url("https://server6.mp3quran.net/akdr", 18).unwrap(),
            "https://server6.mp3quran.net/akdr/018.mp3"
        );
        assert_eq!(
            resolve_audio_url("https://server6.mp3quran.net/akdr", 114).unwrap(),
            "https://server6.mp3quran.net/akdr/114.mp3"
        );
    }

    #[test]
    fn every_valid_surah_resolves_with_exactly_three_digits() {
        for n in 1..=SURAH_COUNT {
            let url = resolve_audio_url("https://host/base", n).unwrap();
            let file = url.rsplit('/').next().unwrap();
            assert_eq!(file.len(), "000.mp3".len(), "bad padding for {}", n);
            assert!(file.ends_with(".mp3"));
        }
    }

    #[test]
    fn rejects_out_of_range_surahs() {
        assert!(resolve_audio_url("https://host/base", 0).is_err());
        assert!(resolve_audio_url("https://host/base", 115).is_err());
    }

    #[test]
    fn rejects_unrecognized_schemes() {
        assert!(resolve_audio_url("ftp://host/base", 1).is_err());
        assert!(resolve_audio_url("server6.mp3quran.net/akdr", 1).is_err());
        assert!(resolve_audio_url("", 1).is_err());
    }

    #[test]
    fn strips_trailing_slash() {
        assert_eq!(
            resolve_audio_url("https://host/base/", 7).unwrap(),
            "https://host/base/007.mp3"
        );
    }
}
