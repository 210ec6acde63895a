//! Device model identification
//!
//! Resolves the identifier used to look the running device up in the hardware
//! catalog. Sources are tried in order: an explicit override, the device tree
//! model string, the DMI product name, and finally the `uname` machine field.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Power supply unavailable: {0}")]
    PowerSupplyUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where the model identifier was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSource {
    Override,
    DeviceTree,
    Dmi,
    Uname,
}

/// Filesystem locations probed for the model identifier
#[derive(Debug, Clone)]
pub struct ModelProbe {
    pub device_tree_paths: Vec<PathBuf>,
    pub dmi_product_path: PathBuf,
    pub use_uname: bool,
}

impl Default for ModelProbe {
    fn default() -> Self {
        Self {
            device_tree_paths: vec![
                PathBuf::from("/sys/firmware/devicetree/base/model"),
                PathBuf::from("/proc/device-tree/model"),
            ],
            dmi_product_path: PathBuf::from("/sys/class/dmi/id/product_name"),
            use_uname: true,
        }
    }
}

impl ModelProbe {
    /// Resolve the model identifier, or `None` if no source yields one
    pub fn detect(&self, override_model: Option<&str>) -> Option<String> {
        self.detect_with_source(override_model).map(|(model, _)| model)
    }

    /// Resolve the model identifier together with the source it came from
    pub fn detect_with_source(&self, override_model: Option<&str>) -> Option<(String, ModelSource)> {
        if let Some(model) = override_model.map(str::trim).filter(|m| !m.is_empty()) {
            tracing::debug!("Using configured device model: {}", model);
            return Some((model.to_string(), ModelSource::Override));
        }

        for path in &self.device_tree_paths {
            if let Some(model) = non_empty(Self::read_device_tree_string(path)) {
                tracing::info!("Detected model from device tree: {}", model);
                return Some((model, ModelSource::DeviceTree));
            }
        }

        if let Some(model) = non_empty(Self::read_file_trimmed(&self.dmi_product_path)) {
            tracing::info!("Detected model from DMI: {}", model);
            return Some((model, ModelSource::Dmi));
        }

        if self.use_uname {
            if let Some(model) = machine_identifier() {
                tracing::info!("Falling back to uname machine: {}", model);
                return Some((model, ModelSource::Uname));
            }
        }

        tracing::warn!("Unable to determine device model");
        None
    }

    /// Read a null-terminated string from device tree
    fn read_device_tree_string(path: &Path) -> Result<String, DeviceError> {
        let bytes = fs::read(path)?;
        let s = String::from_utf8_lossy(&bytes);
        Ok(s.trim_matches('\0').trim().to_string())
    }

    /// Read and trim a text file
    fn read_file_trimmed(path: &Path) -> Result<String, DeviceError> {
        Ok(fs::read_to_string(path)?.trim().to_string())
    }
}

fn non_empty(value: Result<String, DeviceError>) -> Option<String> {
    value.ok().filter(|s| !s.is_empty())
}

/// Machine hardware name reported by `uname`
pub fn machine_identifier() -> Option<String> {
    match nix::sys::utsname::uname() {
        Ok(uts) => {
            let machine = uts.machine().to_string_lossy().trim().to_string();
            (!machine.is_empty()).then_some(machine)
        }
        Err(e) => {
            tracing::warn!("uname failed: {}", e);
            None
        }
    }
}

/// Resolve the running device's model identifier using the default probe
pub fn model_identifier(override_model: Option<&str>) -> Option<String> {
    ModelProbe::default().detect(override_model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn probe_in(dir: &TempDir) -> ModelProbe {
        ModelProbe {
            device_tree_paths: vec![dir.path().join("model")],
            dmi_product_path: dir.path().join("product_name"),
            use_uname: false,
        }
    }

    #[test]
    fn test_override_wins() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("model"), b"Anbernic RG353M\0").unwrap();

        let probe = probe_in(&dir);
        assert_eq!(
            probe.detect_with_source(Some("iPhone14,5")),
            Some(("iPhone14,5".to_string(), ModelSource::Override))
        );
    }

    #[test]
    fn test_blank_override_ignored() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("model"), b"Anbernic RG353M\0").unwrap();

        let probe = probe_in(&dir);
        assert_eq!(probe.detect(Some("   ")), Some("Anbernic RG353M".to_string()));
    }

    #[test]
    fn test_device_tree_strips_nul() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("model"), b"Powkiddy RGB30\0\0").unwrap();

        let probe = probe_in(&dir);
        assert_eq!(
            probe.detect_with_source(None),
            Some(("Powkiddy RGB30".to_string(), ModelSource::DeviceTree))
        );
    }

    #[test]
    fn test_dmi_fallback() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("product_name"), "Jupiter\n").unwrap();

        let probe = probe_in(&dir);
        assert_eq!(
            probe.detect_with_source(None),
            Some(("Jupiter".to_string(), ModelSource::Dmi))
        );
    }

    #[test]
    fn test_empty_device_tree_falls_through() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("model"), b"\0").unwrap();
        fs::write(dir.path().join("product_name"), "Jupiter\n").unwrap();

        let probe = probe_in(&dir);
        assert_eq!(probe.detect(None), Some("Jupiter".to_string()));
    }

    #[test]
    fn test_nothing_found() {
        let dir = TempDir::new().unwrap();
        let probe = probe_in(&dir);
        assert_eq!(probe.detect(None), None);
    }

    #[test]
    fn test_uname_machine_not_empty() {
        // Every Unix host reports a machine name
        let machine = machine_identifier();
        assert!(machine.is_some_and(|m| !m.is_empty()));
    }

    #[test]
    fn test_device_error_display() {
        let err = DeviceError::PowerSupplyUnavailable("battery".into());
        assert_eq!(format!("{err}"), "Power supply unavailable: battery");
    }
}
