//! `song.ini` companion metadata

use crate::encoding;
use crate::error::Result;
use log::warn;
use std::collections::HashMap;
use std::path::Path;

/// Parsed `key = value` pairs from a `song.ini`; keys are lowercased
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SongIni {
    values: HashMap<String, String>,
}

impl SongIni {
    /// Parse ini text; section headers and lines without `=` are skipped
    pub fn parse(text: &str) -> Self {
        let values = text
            .lines()
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| (key.trim().to_lowercase(), value.trim().to_string()))
            .collect();
        Self { values }
    }

    /// Read and parse a `song.ini` file
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Ok(Self::parse(&encoding::decode(&data)))
    }

    /// Like [`SongIni::load`], but falls back to empty metadata on failure
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(ini) => ini,
            Err(e) => {
                warn!("Failed to parse {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Value for a case-insensitive key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&key.to_lowercase()).map(String::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name")
    }

    pub fn artist(&self) -> Option<&str> {
        self.get("artist")
    }

    pub fn genre(&self) -> Option<&str> {
        self.get("genre")
    }

    pub fn charter(&self) -> Option<&str> {
        self.get("charter")
    }

    /// Preview start in seconds (`preview_start_time` is in milliseconds)
    pub fn preview_start_seconds(&self) -> Option<f64> {
        let raw = self.get("preview_start_time")?;
        match raw.parse::<f64>() {
            Ok(millis) => Some(millis / 1000.0),
            Err(_) => {
                warn!("Ignoring invalid preview_start_time '{}'", raw);
                None
            }
        }
    }

    /// Guitar difficulty rating, at least 1
    pub fn guitar_difficulty(&self) -> u32 {
        let Some(raw) = self.get("diff_guitar") else {
            return 1;
        };
        match raw.parse::<i64>() {
            Ok(value) => value.clamp(1, u32::MAX as i64) as u32,
            Err(_) => {
                warn!("Ignoring invalid diff_guitar '{}'", raw);
                1
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INI: &str = "[song]\nName = Through the Fire\nARTIST=DragonForce\ngenre = Power Metal\ncharter = someone = else\npreview_start_time = 12500\ndiff_guitar = 6\n";

    #[test]
    fn test_parse_keys_case_insensitive() {
        let ini = SongIni::parse(INI);
        assert_eq!(ini.name(), Some("Through the Fire"));
        assert_eq!(ini.artist(), Some("DragonForce"));
        assert_eq!(ini.genre(), Some("Power Metal"));
        assert_eq!(ini.get("Genre"), Some("Power Metal"));
        assert_eq!(ini.charter(), Some("someone = else"));
    }

    #[test]
    fn test_preview_and_difficulty() {
        let ini = SongIni::parse(INI);
        assert_eq!(ini.preview_start_seconds(), Some(12.5));
        assert_eq!(ini.guitar_difficulty(), 6);
    }

    #[test]
    fn test_difficulty_defaults_and_clamps() {
        assert_eq!(SongIni::default().guitar_difficulty(), 1);
        assert_eq!(SongIni::parse("diff_guitar = -1").guitar_difficulty(), 1);
        assert_eq!(SongIni::parse("diff_guitar = 0").guitar_difficulty(), 1);
        assert_eq!(SongIni::parse("diff_guitar = hard").guitar_difficulty(), 1);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let ini = SongIni::load_or_default(Path::new("/nonexistent/song.ini"));
        assert_eq!(ini, SongIni::default());
        assert_eq!(ini.preview_start_seconds(), None);
    }
}
