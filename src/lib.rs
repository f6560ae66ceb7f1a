//! Persistent configuration store of a multirotor flight controller.
//!
//! The store holds every user adjustable setting, grouped into independently versioned groups
//! (see [`registry`]). [`DeviceConfig`] loads it from non-volatile storage, repairs inconsistent
//! combinations of settings (see [`repair`]), pushes it into the runtime subsystems and writes it
//! back. PID and rate profiles can be switched at runtime (see [`profile`]).
//!
//! The library builds without `std` for bare-metal targets, everything touching files is only
//! available on hosted platforms.

#![cfg_attr(target_os = "none", no_std)]

pub mod beeper;
pub mod config;
pub mod platform;
pub mod profile;
pub mod registry;
pub mod repair;
pub mod settings;
pub mod storage;
pub mod target;
pub mod timing;

pub use config::DeviceConfig;
pub use platform::Platform;
pub use repair::RepairReport;
pub use settings::Settings;
pub use storage::{ConfigStorage, MemoryStorage, StorageError};
pub use target::{Capabilities, Target};
pub use timing::SensorModel;

#[cfg(not(target_os = "none"))]
pub use storage::FileStorage;
