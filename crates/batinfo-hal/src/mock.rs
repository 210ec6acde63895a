//! Mock power source for testing without a battery
//!
//! ```
//! use batinfo_hal::{ChargeState, MockPower, PowerSource};
//!
//! let power = MockPower::new();
//! power.set_level(Some(0.5));
//! power.set_state(ChargeState::Charging);
//!
//! let snapshot = power.snapshot().unwrap();
//! assert_eq!(snapshot.percent(), Some(50));
//! ```

use crate::{ChargeState, DeviceError, PowerSnapshot, PowerSource};
use std::sync::{Arc, RwLock};

/// Mock power source backed by shared state
///
/// Clones share the same state, so a test can keep one handle while a
/// watcher polls another.
#[derive(Debug, Clone)]
pub struct MockPower {
    state: Arc<RwLock<PowerSnapshot>>,
}

impl MockPower {
    pub fn new() -> Self {
        Self::with_snapshot(PowerSnapshot {
            level: Some(0.85),
            state: ChargeState::Unplugged,
            low_power_mode: false,
        })
    }

    pub fn with_snapshot(snapshot: PowerSnapshot) -> Self {
        Self {
            state: Arc::new(RwLock::new(snapshot)),
        }
    }

    /// Simulate battery level change
    pub fn set_level(&self, level: Option<f32>) {
        if let Ok(mut state) = self.state.write() {
            state.level = level.map(|l| l.clamp(0.0, 1.0));
        }
    }

    /// Simulate charger plug/unplug
    pub fn set_state(&self, charge_state: ChargeState) {
        if let Ok(mut state) = self.state.write() {
            state.state = charge_state;
        }
    }

    pub fn set_low_power_mode(&self, enabled: bool) {
        if let Ok(mut state) = self.state.write() {
            state.low_power_mode = enabled;
        }
        tracing::debug!("[MOCK] low power mode set to {}", enabled);
    }
}

impl Default for MockPower {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerSource for MockPower {
    fn snapshot(&self) -> Result<PowerSnapshot, DeviceError> {
        self.state
            .read()
            .map(|s| *s)
            .map_err(|_| DeviceError::PowerSupplyUnavailable("mock state poisoned".into()))
    }
}
