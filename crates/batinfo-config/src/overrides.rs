//! User-entered battery overrides
//!
//! Two string values kept in a small key-value TOML file: the measured battery
//! capacity and the battery health percentage. An empty string means unset.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{ConfigError, user_config_dir};

/// Storage key of the measured capacity (mAh)
pub const MAX_VALUE_KEY: &str = "inputMaxValue";
/// Storage key of the health percentage
pub const LEVEL_VALUE_KEY: &str = "inputLevelValue";

/// Overrides as stored; values are kept verbatim
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOverrides {
    #[serde(rename = "inputMaxValue", default)]
    pub measured_capacity: String,
    #[serde(rename = "inputLevelValue", default)]
    pub health_percent: String,
}

impl UserOverrides {
    /// Measured capacity, if set
    pub fn measured_capacity(&self) -> Option<&str> {
        non_blank(&self.measured_capacity)
    }

    /// Health percentage, if set
    pub fn health_percent(&self) -> Option<&str> {
        non_blank(&self.health_percent)
    }

    /// Value stored under a key
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            MAX_VALUE_KEY => Some(self.measured_capacity.as_str()),
            LEVEL_VALUE_KEY => Some(self.health_percent.as_str()),
            _ => None,
        }
    }

    /// Set the value stored under a key, returning false for unknown keys
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        match key {
            MAX_VALUE_KEY => self.measured_capacity = value.into(),
            LEVEL_VALUE_KEY => self.health_percent = value.into(),
            _ => return false,
        }
        true
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

/// File-backed override storage
#[derive(Debug, Clone)]
pub struct OverrideStore {
    path: PathBuf,
}

impl OverrideStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `overrides.toml` in the user config dir
    pub fn default_path() -> PathBuf {
        user_config_dir().join("overrides.toml")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored overrides; a missing file yields empty overrides
    pub fn load(&self) -> Result<UserOverrides, ConfigError> {
        if !self.path.exists() {
            tracing::debug!("No override store at {}", self.path.display());
            return Ok(UserOverrides::default());
        }

        let contents = std::fs::read_to_string(&self.path)?;
        let overrides: UserOverrides = toml::from_str(&contents)?;
        Ok(overrides)
    }

    /// Write all overrides
    pub fn save(&self, overrides: &UserOverrides) -> Result<(), ConfigError> {
        let contents = toml::to_string(overrides)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&self.path, contents)?;
        tracing::debug!("Overrides saved to {}", self.path.display());
        Ok(())
    }

    /// Update one key and persist immediately
    pub fn set_value(&self, key: &str, value: &str) -> Result<UserOverrides, ConfigError> {
        let mut overrides = self.load()?;
        if !overrides.set(key, value) {
            return Err(ConfigError::Invalid(format!("Unknown override key: {key}")));
        }
        self.save(&overrides)?;
        Ok(overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_blank_values_are_unset() {
        let overrides = UserOverrides {
            measured_capacity: "  ".into(),
            health_percent: String::new(),
        };
        assert_eq!(overrides.measured_capacity(), None);
        assert_eq!(overrides.health_percent(), None);
    }

    #[test]
    fn test_get_set_by_key() {
        let mut overrides = UserOverrides::default();
        assert!(overrides.set(MAX_VALUE_KEY, "2800"));
        assert!(overrides.set(LEVEL_VALUE_KEY, "90"));
        assert!(!overrides.set("unknown", "1"));

        assert_eq!(overrides.get(MAX_VALUE_KEY), Some("2800"));
        assert_eq!(overrides.get(LEVEL_VALUE_KEY), Some("90"));
        assert_eq!(overrides.get("unknown"), None);
        assert_eq!(overrides.measured_capacity(), Some("2800"));
    }

    #[test]
    fn test_stored_key_names() {
        let overrides = UserOverrides {
            measured_capacity: "2800".into(),
            health_percent: "90".into(),
        };
        let toml_str = toml::to_string(&overrides).unwrap();
        assert!(toml_str.contains("inputMaxValue = \"2800\""));
        assert!(toml_str.contains("inputLevelValue = \"90\""));
    }

    #[test]
    fn test_load_missing_store() {
        let dir = TempDir::new().unwrap();
        let store = OverrideStore::new(dir.path().join("overrides.toml"));
        assert_eq!(store.load().unwrap(), UserOverrides::default());
    }

    #[test]
    fn test_load_partial_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("overrides.toml");
        std::fs::write(&path, "inputLevelValue = \"95\"\n").unwrap();

        let overrides = OverrideStore::new(&path).load().unwrap();
        assert_eq!(overrides.health_percent(), Some("95"));
        assert_eq!(overrides.measured_capacity(), None);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let store = OverrideStore::new(dir.path().join("nested/overrides.toml"));

        let overrides = UserOverrides {
            measured_capacity: "3100".into(),
            health_percent: "88".into(),
        };
        store.save(&overrides).unwrap();

        assert_eq!(store.load().unwrap(), overrides);
    }

    #[test]
    fn test_set_value_persists() {
        let dir = TempDir::new().unwrap();
        let store = OverrideStore::new(dir.path().join("overrides.toml"));

        store.set_value(MAX_VALUE_KEY, "2800").unwrap();
        store.set_value(LEVEL_VALUE_KEY, "90").unwrap();

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.measured_capacity(), Some("2800"));
        assert_eq!(reloaded.health_percent(), Some("90"));

        assert!(matches!(
            store.set_value("bogus", "1"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_corrupt_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("overrides.toml");
        std::fs::write(&path, "inputMaxValue = [").unwrap();

        assert!(matches!(
            OverrideStore::new(&path).load(),
            Err(ConfigError::TomlParse(_))
        ));
    }
}
