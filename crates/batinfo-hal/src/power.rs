//! Battery state
//!
//! Reads the live battery fraction, charging state and low power mode from sysfs.
//! Battery and charger directories are auto-detected under the power supply class.

use crate::DeviceError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Charging state of the battery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeState {
    #[default]
    Unknown,
    /// Running on battery
    Unplugged,
    Charging,
    /// Plugged in and fully charged
    Full,
}

impl ChargeState {
    /// Map a sysfs `status` string, taking the charger connection into account
    pub fn from_sysfs(status: &str, charger_online: bool) -> Self {
        match status.trim() {
            "Charging" => ChargeState::Charging,
            "Discharging" => ChargeState::Unplugged,
            "Full" => ChargeState::Full,
            // Held at a charge limit while plugged in
            "Not charging" if charger_online => ChargeState::Full,
            "Not charging" => ChargeState::Unplugged,
            _ if charger_online => ChargeState::Charging,
            _ => ChargeState::Unknown,
        }
    }
}

/// Point-in-time view of the power state
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PowerSnapshot {
    /// Charge fraction in `0.0..=1.0`, `None` when no battery is readable
    pub level: Option<f32>,
    pub state: ChargeState,
    pub low_power_mode: bool,
}

impl PowerSnapshot {
    /// Charge as a whole percentage
    pub fn percent(&self) -> Option<u8> {
        self.level.map(|l| (l * 100.0).round().clamp(0.0, 100.0) as u8)
    }
}

/// Anything that can report the current power state
pub trait PowerSource: Send + Sync {
    fn snapshot(&self) -> Result<PowerSnapshot, DeviceError>;
}

/// Power manager configuration, also the `[power]` config section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerConfig {
    /// Directory scanned for battery and charger entries
    pub power_supply_dir: PathBuf,
    pub battery_path: PathBuf,
    pub charger_path: PathBuf,
    pub platform_profile_path: PathBuf,
    pub governor_path: PathBuf,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            power_supply_dir: PathBuf::from("/sys/class/power_supply"),
            battery_path: PathBuf::from("/sys/class/power_supply/battery"),
            charger_path: PathBuf::from("/sys/class/power_supply/usb"),
            platform_profile_path: PathBuf::from("/sys/firmware/acpi/platform_profile"),
            governor_path: PathBuf::from("/sys/devices/system/cpu/cpu0/cpufreq/scaling_governor"),
        }
    }
}

/// Sysfs-backed power source
pub struct PowerManager {
    config: PowerConfig,
    battery_path: PathBuf,
    charger_path: PathBuf,
}

impl PowerManager {
    /// Create a new power manager
    pub fn new() -> Result<Self, DeviceError> {
        Self::with_config(PowerConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(config: PowerConfig) -> Result<Self, DeviceError> {
        let mut manager = Self {
            battery_path: config.battery_path.clone(),
            charger_path: config.charger_path.clone(),
            config,
        };

        manager.detect_power_supplies()?;

        Ok(manager)
    }

    /// Detect power supply sysfs paths
    fn detect_power_supplies(&mut self) -> Result<(), DeviceError> {
        let power_supply_dir = self.config.power_supply_dir.clone();
        if !power_supply_dir.exists() {
            tracing::debug!("{} does not exist", power_supply_dir.display());
            return Ok(());
        }

        let mut entries: Vec<_> = fs::read_dir(&power_supply_dir)?
            .filter_map(|e| e.ok())
            .collect();
        // First battery in name order (BAT0 before BAT1)
        entries.sort_by_key(|e| e.file_name());

        let mut found_battery = false;
        let mut found_charger = false;

        for entry in entries {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_lowercase();

            let Ok(psu_type) = fs::read_to_string(path.join("type")) else {
                continue;
            };
            let psu_type = psu_type.trim().to_lowercase();

            if psu_type == "battery" && !found_battery {
                // Peripheral batteries (mice, controllers) report scope=Device
                let scope = fs::read_to_string(path.join("scope")).unwrap_or_default();
                if scope.trim().eq_ignore_ascii_case("device") {
                    continue;
                }
                tracing::info!("Found battery at {}", path.display());
                self.battery_path = path;
                found_battery = true;
            } else if (psu_type == "usb" || psu_type == "mains" || name.contains("charger"))
                && !found_charger
            {
                tracing::info!("Found charger at {}", path.display());
                self.charger_path = path;
                found_charger = true;
            }
        }

        if !found_battery {
            tracing::warn!("No battery found under {}", power_supply_dir.display());
        }

        Ok(())
    }

    /// Charge fraction from `capacity`, falling back to charge or energy counters
    pub fn battery_level(&self) -> Option<f32> {
        if let Some(capacity) = read_sysfs_int(&self.battery_path.join("capacity")) {
            return Some((capacity as f32 / 100.0).clamp(0.0, 1.0));
        }

        for (now, full) in [("charge_now", "charge_full"), ("energy_now", "energy_full")] {
            let now = read_sysfs_int(&self.battery_path.join(now));
            let full = read_sysfs_int(&self.battery_path.join(full));
            if let (Some(now), Some(full)) = (now, full) {
                if full > 0 {
                    return Some((now as f32 / full as f32).clamp(0.0, 1.0));
                }
            }
        }

        None
    }

    /// Charging state
    pub fn charge_state(&self) -> ChargeState {
        let online = self.is_charger_connected();
        match fs::read_to_string(self.battery_path.join("status")) {
            Ok(status) => ChargeState::from_sysfs(&status, online),
            Err(_) if online => ChargeState::Charging,
            Err(_) => ChargeState::Unknown,
        }
    }

    /// Check if charger is connected
    pub fn is_charger_connected(&self) -> bool {
        let online_path = self.charger_path.join("online");
        if let Ok(contents) = fs::read_to_string(&online_path) {
            return contents.trim() == "1";
        }

        false
    }

    /// Whether the system runs in a power saving profile
    pub fn is_low_power_mode(&self) -> bool {
        if let Ok(profile) = fs::read_to_string(&self.config.platform_profile_path) {
            return matches!(profile.trim(), "low-power" | "quiet");
        }

        fs::read_to_string(&self.config.governor_path)
            .map(|g| g.trim() == "powersave")
            .unwrap_or(false)
    }

    /// Detected battery directory
    pub fn battery_path(&self) -> &Path {
        &self.battery_path
    }
}

impl PowerSource for PowerManager {
    fn snapshot(&self) -> Result<PowerSnapshot, DeviceError> {
        Ok(PowerSnapshot {
            level: self.battery_level(),
            state: self.charge_state(),
            low_power_mode: self.is_low_power_mode(),
        })
    }
}

/// Read integer from sysfs file
fn read_sysfs_int(path: &Path) -> Option<i64> {
    fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
}
