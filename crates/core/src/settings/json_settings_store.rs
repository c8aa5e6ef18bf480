use std::fs;
use std::path::{Path, PathBuf};

use crate::settings::detector_settings::DetectorSettings;
use crate::settings::settings_error::SettingsError;
use crate::shared::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};

/// Reads and writes [`DetectorSettings`] as pretty-printed JSON.
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `config.json` in the working directory.
    pub fn in_working_dir() -> Self {
        Self::new(CONFIG_FILE_NAME)
    }

    /// `<user config dir>/CellClick/config.json`.
    pub fn default_location() -> Result<PathBuf, SettingsError> {
        dirs::config_dir()
            .map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or(SettingsError::NoConfigDir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and validates the settings file.
    pub fn try_load(&self) -> Result<DetectorSettings, SettingsError> {
        let json = fs::read_to_string(&self.path).map_err(|source| SettingsError::Read {
            path: self.path.clone(),
            source,
        })?;
        let settings: DetectorSettings =
            serde_json::from_str(&json).map_err(|source| SettingsError::Parse {
                path: self.path.clone(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Like [`try_load`](Self::try_load) but falls back to defaults, logging
    /// why.
    pub fn load(&self) -> DetectorSettings {
        self.try_load().unwrap_or_else(|e| {
            log::warn!("Using default settings: {e}");
            DetectorSettings::default()
        })
    }

    pub fn save(&self, settings: &DetectorSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        let json = serde_json::to_string_pretty(settings).map_err(SettingsError::Serialize)?;
        fs::write(&self.path, json).map_err(|source| SettingsError::Write {
            path: self.path.clone(),
            source,
        })?;
        log::debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::detector_config::CellColor;

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::new(dir.path().join("config.json"));
        let mut settings = DetectorSettings::default();
        settings.cell_color = CellColor::Red;
        settings.circularity = 0.55;

        store.save(&settings).unwrap();
        assert_eq!(store.try_load().unwrap(), settings);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::new(dir.path().join("a").join("b").join("config.json"));
        store.save(&DetectorSettings::default()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_saved_file_is_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::new(dir.path().join("config.json"));
        store.save(&DetectorSettings::default()).unwrap();
        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("\n"));
        assert!(text.contains("\"hueMin\""));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::new(dir.path().join("missing.json"));
        assert!(matches!(store.try_load(), Err(SettingsError::Read { .. })));
        assert_eq!(store.load(), DetectorSettings::default());
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let store = JsonSettingsStore::new(&path);
        assert!(matches!(store.try_load(), Err(SettingsError::Parse { .. })));
        assert_eq!(store.load(), DetectorSettings::default());
    }

    #[test]
    fn test_invalid_values_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"circularity": 4.0}"#).unwrap();
        let store = JsonSettingsStore::new(&path);
        assert!(matches!(store.try_load(), Err(SettingsError::Invalid { .. })));
        assert_eq!(store.load(), DetectorSettings::default());
    }

    #[test]
    fn test_in_working_dir_is_relative_config_file() {
        assert_eq!(JsonSettingsStore::in_working_dir().path(), Path::new(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_default_location_ends_with_config_file() {
        if let Ok(path) = JsonSettingsStore::default_location() {
            assert!(path.ends_with(Path::new(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)));
        }
    }
}
