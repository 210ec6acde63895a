//! Device hardware catalog
//!
//! A TOML table keyed by model identifier, one flat record per device. A
//! bundled copy is compiled into the binary; an external file may replace it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::ConfigError;

/// Catalog compiled into the binary
pub const BUNDLED_CATALOG: &str = include_str!("../data/devices.toml");

/// Hardware specification of one device model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSpec {
    /// Nominal battery capacity with unit suffix, e.g. `3227mAh`
    #[serde(rename = "battery")]
    pub battery_capacity: String,
    pub cpu: String,
    #[serde(rename = "freq")]
    pub clock_frequency: String,
    /// Screen diagonal in inches
    #[serde(rename = "inch")]
    pub screen_size_inches: String,
    #[serde(rename = "mem")]
    pub memory: String,
    #[serde(rename = "ppi")]
    pub pixel_density: String,
    pub resolution: String,
}

/// Model identifier to hardware spec table
#[derive(Debug, Clone, Default)]
pub struct DeviceCatalog {
    entries: BTreeMap<String, DeviceSpec>,
}

impl DeviceCatalog {
    /// Catalog with no entries; every lookup misses
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse the bundled catalog
    pub fn bundled() -> Result<Self, ConfigError> {
        Self::from_toml_str(BUNDLED_CATALOG)
    }

    /// Load a catalog file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        let catalog = Self::from_toml_str(&contents)?;
        tracing::info!(
            "Loaded {} device entries from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Parse a catalog table
    ///
    /// Entries that do not decode into a [`DeviceSpec`] are logged and skipped.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = contents.parse()?;
        let mut entries = BTreeMap::new();

        for (model, value) in table {
            match value.try_into::<DeviceSpec>() {
                Ok(spec) => {
                    entries.insert(model, spec);
                }
                Err(e) => {
                    tracing::warn!("Failed to decode device entry for key {}: {}", model, e);
                }
            }
        }

        Ok(Self { entries })
    }

    /// Find the spec for a model identifier
    ///
    /// An exact key wins. Otherwise the first key, in key order, that contains
    /// the identifier is used. Blank identifiers never match.
    pub fn lookup(&self, model: &str) -> Option<&DeviceSpec> {
        self.lookup_entry(model).map(|(_, spec)| spec)
    }

    /// Like [`lookup`](Self::lookup), also returning the matching key
    pub fn lookup_entry(&self, model: &str) -> Option<(&str, &DeviceSpec)> {
        let model = model.trim();
        if model.is_empty() {
            return None;
        }

        if let Some((key, spec)) = self.entries.get_key_value(model) {
            return Some((key.as_str(), spec));
        }

        let mut matches = self.entries.iter().filter(|(key, _)| key.contains(model));
        let first = matches.next();
        if let Some((key, _)) = first {
            let others: Vec<&str> = matches.map(|(k, _)| k.as_str()).collect();
            if !others.is_empty() {
                tracing::debug!(
                    "Model {} matches several catalog keys, using {} (also {:?})",
                    model,
                    key,
                    others
                );
            }
        }
        first.map(|(key, spec)| (key.as_str(), spec))
    }

    /// Resolve an identifier that may not have been obtainable
    pub fn resolve(&self, model: Option<&str>) -> Option<&DeviceSpec> {
        model.and_then(|m| self.lookup(m))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Catalog keys in lookup order
    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
