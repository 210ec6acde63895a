//! Platform layer for the battery status viewer
//!
//! Reads the live battery state from Linux sysfs, resolves the running device's
//! model identifier, and publishes power state changes as a stream of events.
//!
//! # Example
//!
//! ```no_run
//! use batinfo_hal::{PowerManager, PowerSource, device};
//!
//! fn main() -> anyhow::Result<()> {
//!     let power = PowerManager::new()?;
//!     let snapshot = power.snapshot()?;
//!     println!("Level: {:?}, state: {:?}", snapshot.level, snapshot.state);
//!
//!     if let Some(model) = device::model_identifier(None) {
//!         println!("Model: {model}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod mock;
pub mod power;
pub mod watcher;

pub use device::{DeviceError, ModelProbe};
pub use mock::MockPower;
pub use power::{ChargeState, PowerConfig, PowerManager, PowerSnapshot, PowerSource};
pub use watcher::{PowerEvent, PowerWatcher};

/// HAL Result type
pub type Result<T> = std::result::Result<T, DeviceError>;
