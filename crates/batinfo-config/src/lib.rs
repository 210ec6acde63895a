//! Configuration management for batinfo
//!
//! Handles the application config file, the bundled device catalog and the
//! user-entered battery overrides. Config files are TOML; `BATINFO_*`
//! environment variables override file values.

mod catalog;
mod overrides;

pub use catalog::{BUNDLED_CATALOG, DeviceCatalog, DeviceSpec};
pub use overrides::{LEVEL_VALUE_KEY, MAX_VALUE_KEY, OverrideStore, UserOverrides};

use batinfo_hal::PowerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration layering error: {0}")]
    Layered(#[from] config::ConfigError),
}

/// Standard configuration paths
pub const CONFIG_DIR: &str = "/etc/batinfo";
pub const CONFIG_FILE: &str = "config.toml";
pub const ENV_PREFIX: &str = "BATINFO";

/// Per-user configuration directory (`$XDG_CONFIG_HOME/batinfo` or `~/.config/batinfo`)
pub fn user_config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg).join("batinfo");
    }
    if let Some(home) = std::env::var_os("HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(home).join(".config").join("batinfo");
    }
    PathBuf::from(".batinfo")
}

/// `BATINFO_*` variables; `__` separates nested keys
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Display language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en", alias = "EN", alias = "en-US")]
    En,
    #[serde(rename = "zh-CN", alias = "zh", alias = "zh-cn", alias = "zh_CN")]
    ZhCn,
}

fn default_refresh_interval() -> u64 {
    1000
}

/// Main batinfo configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub language: Language,

    /// Model identifier to use instead of the detected one
    pub device_model: Option<String>,

    /// External catalog replacing the bundled one
    pub catalog_path: Option<PathBuf>,

    /// Override store location (defaults to the user config dir)
    pub overrides_path: Option<PathBuf>,

    /// Power state polling interval
    pub refresh_interval_ms: u64,

    /// Use the in-memory mock power source instead of sysfs
    pub mock_power: bool,

    /// Sysfs locations for the power source
    pub power: PowerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            device_model: None,
            catalog_path: None,
            overrides_path: None,
            refresh_interval_ms: default_refresh_interval(),
            mock_power: false,
            power: PowerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a file (if any) with `BATINFO_*` environment variables layered on top
    ///
    /// Nested keys use a double underscore: `BATINFO_POWER__BATTERY_PATH`.
    pub fn load_layered(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_environment(path, environment())
    }

    fn load_with_environment(
        path: Option<&Path>,
        environment: config::Environment,
    ) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }

        builder = builder.add_source(environment);

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load_default() -> Result<Self, ConfigError> {
        // Try user config first, then system config
        let user_config = user_config_dir().join(CONFIG_FILE);
        if user_config.exists() {
            tracing::debug!("Loading {}", user_config.display());
            return Self::load_layered(Some(&user_config));
        }

        let system_config = Path::new(CONFIG_DIR).join(CONFIG_FILE);
        if system_config.exists() {
            tracing::debug!("Loading {}", system_config.display());
            return Self::load_layered(Some(&system_config));
        }

        tracing::warn!("No configuration file found, using defaults");
        Self::load_layered(None)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;
        tracing::info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Override store path, falling back to the user config dir
    pub fn overrides_path(&self) -> PathBuf {
        self.overrides_path
            .clone()
            .unwrap_or_else(OverrideStore::default_path)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "refresh_interval_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.language, Language::En);
        assert_eq!(config.refresh_interval_ms, 1000);
        assert!(config.device_model.is_none());
        assert!(!config.mock_power);
    }

    #[test]
    fn test_serialize_deserialize() {
        let config = AppConfig {
            language: Language::ZhCn,
            device_model: Some("iPhone14,5".into()),
            ..AppConfig::default()
        };
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("language = \"zh-CN\""));

        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_language_aliases() {
        #[derive(Deserialize)]
        struct Wrapper {
            language: Language,
        }

        let parsed: Wrapper = toml::from_str("language = \"zh\"").unwrap();
        assert_eq!(parsed.language, Language::ZhCn);

        let parsed: Wrapper = toml::from_str("language = \"en-US\"").unwrap();
        assert_eq!(parsed.language, Language::En);
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::NotFound(PathBuf::from("/etc/batinfo/config.toml"));
        assert!(format!("{}", err).contains("not found"));

        let err = ConfigError::Invalid("test error".to_string());
        assert!(format!("{}", err).contains("Invalid"));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let config_content = r#"
language = "zh-CN"
device_model = "iPhone14,5"
refresh_interval_ms = 250

[power]
battery_path = "/sys/class/power_supply/BAT1"
"#;
        write!(temp_file, "{}", config_content).unwrap();

        let config = AppConfig::load(temp_file.path()).unwrap();
        assert_eq!(config.language, Language::ZhCn);
        assert_eq!(config.device_model.as_deref(), Some("iPhone14,5"));
        assert_eq!(config.refresh_interval_ms, 250);
        assert_eq!(
            config.power.battery_path,
            PathBuf::from("/sys/class/power_supply/BAT1")
        );
        // Unset nested keys keep their defaults
        assert_eq!(
            config.power.power_supply_dir,
            PathBuf::from("/sys/class/power_supply")
        );
    }

    #[test]
    fn test_load_missing_file() {
        let result = AppConfig::load(Path::new("/nonexistent/batinfo.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_rejects_zero_interval() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "refresh_interval_ms = 0").unwrap();

        let result = AppConfig::load(temp_file.path());
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_layered_from_file() {
        let mut temp_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(temp_file, "mock_power = true\nrefresh_interval_ms = 500\n").unwrap();

        let config = AppConfig::load_layered(Some(temp_file.path())).unwrap();
        assert!(config.mock_power);
        assert_eq!(config.refresh_interval_ms, 500);
        assert_eq!(config.language, Language::En);
    }

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(map))
    }

    #[test]
    fn test_environment_overrides() {
        let config = AppConfig::load_with_environment(
            None,
            env(&[
                ("BATINFO_DEVICE_MODEL", "iPhone14,5"),
                ("BATINFO_MOCK_POWER", "true"),
                ("BATINFO_POWER__BATTERY_PATH", "/x/BAT9"),
                ("BATINFO_LANGUAGE", "zh-CN"),
            ]),
        )
        .unwrap();

        assert_eq!(config.device_model.as_deref(), Some("iPhone14,5"));
        assert!(config.mock_power);
        assert_eq!(config.power.battery_path, PathBuf::from("/x/BAT9"));
        assert_eq!(config.language, Language::ZhCn);
        assert_eq!(
            config.power.charger_path,
            PathBuf::from("/sys/class/power_supply/usb")
        );
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut temp_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(temp_file, "refresh_interval_ms = 500\nmock_power = false\n").unwrap();

        let config = AppConfig::load_with_environment(
            Some(temp_file.path()),
            env(&[
                ("BATINFO_REFRESH_INTERVAL_MS", "2000"),
                ("BATINFO_MOCK_POWER", "true"),
                ("OTHER_MOCK_POWER", "false"),
            ]),
        )
        .unwrap();

        assert_eq!(config.refresh_interval_ms, 2000);
        assert!(config.mock_power);
    }

    #[test]
    fn test_power_section_is_power_config() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(
            temp_file,
            "[power]\ncharger_path = \"/sys/class/power_supply/AC\"\n"
        )
        .unwrap();

        let config = AppConfig::load(temp_file.path()).unwrap();
        assert_eq!(
            config.power,
            PowerConfig {
                charger_path: PathBuf::from("/sys/class/power_supply/AC"),
                ..PowerConfig::default()
            }
        );

        config.save(temp_file.path()).unwrap();
        let reloaded = AppConfig::load(temp_file.path()).unwrap();
        assert_eq!(reloaded.power, config.power);
    }

    #[test]
    fn test_save_config() {
        let temp_file = NamedTempFile::new().unwrap();
        let config = AppConfig {
            catalog_path: Some(PathBuf::from("/opt/devices.toml")),
            ..AppConfig::default()
        };

        config.save(temp_file.path()).unwrap();

        let loaded = AppConfig::load(temp_file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_overrides_path_explicit() {
        let config = AppConfig {
            overrides_path: Some(PathBuf::from("/tmp/overrides.toml")),
            ..AppConfig::default()
        };
        assert_eq!(config.overrides_path(), PathBuf::from("/tmp/overrides.toml"));
    }

    #[test]
    fn test_constants() {
        assert_eq!(CONFIG_DIR, "/etc/batinfo");
        assert_eq!(ENV_PREFIX, "BATINFO");
    }
}
