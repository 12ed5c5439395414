use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::options::DecodeOptions;
use crate::toggle::ToggleBinding;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Preferred decoder name; `None` takes the first one that resolves.
    pub decoder: Option<String>,
    pub options: DecodeOptions,
    pub toggles: Vec<ToggleBinding>,
}

impl ScanConfig {
    /// Load from the default location, if present and readable.
    pub fn load() -> Option<Self> {
        let config_path = Self::config_path()?;

        fs::read_to_string(&config_path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self) -> Option<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path).ok()
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(write_err)
    }

    pub fn config_path() -> Option<PathBuf> {
        let home = std::env::home_dir()?;
        Some(home.join(".config").join("codescan").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = ScanConfig {
            decoder: Some("jsqr".into()),
            options: DecodeOptions::new().with("inversionAttempts", "attemptBoth"),
            toggles: vec![ToggleBinding::new("scan-help", "#help")],
        };
        config.save_to(&path).unwrap();

        assert_eq!(ScanConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn missing_fields_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"decoder": "zbar"}"#).unwrap();

        let config = ScanConfig::load_from(&path).unwrap();
        assert_eq!(config.decoder.as_deref(), Some("zbar"));
        assert!(config.options.is_empty());
        assert!(config.toggles.is_empty());
    }

    #[test]
    fn typed_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            ScanConfig::load_from(&missing),
            Err(ConfigError::Read { .. })
        ));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{").unwrap();
        assert!(matches!(
            ScanConfig::load_from(&broken),
            Err(ConfigError::Parse { .. })
        ));
    }
}
