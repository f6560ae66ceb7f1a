//! Data structures for the persistent configuration kept in non-volatile storage.
//!
//! The store is partitioned into groups, each of which is stored, versioned and reset
//! independently (see [`crate::registry`]). PID and rate profiles are stored as arrays, only one
//! entry of each is active at a time.

mod features;
mod gyro;
mod modes;
mod motor;
mod peripherals;
mod profiles;
mod rx;
mod serial;
mod system;

use serde::{Deserialize, Serialize};

pub use features::*;
pub use gyro::*;
pub use modes::*;
pub use motor::*;
pub use peripherals::*;
pub use profiles::*;
pub use rx::*;
pub use serial::*;
pub use system::*;

/// Hard upper bound for every filter frequency (Hz).
pub const FILTER_FREQUENCY_MAX: u16 = 4000;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub pilot: PilotConfig,
    pub system: SystemConfig,
    pub features: FeatureSet,
    pub serial: SerialConfig,
    pub rx: RxConfig,
    pub motor: MotorConfig,
    pub gyro: GyroConfig,
    pub pid: PidConfig,
    pub accelerometer: AccelerometerConfig,
    pub throttle_correction: ThrottleCorrectionConfig,
    pub gps: GpsConfig,
    pub failsafe: FailsafeConfig,
    pub modes: ModeActivations,
    pub beeper: BeeperConfig,
    pub blackbox: BlackboxConfig,
    pub vtx: VtxSettings,
    pub vtx_table: VtxTable,
    pub pid_profiles: [PidProfile; PID_PROFILE_COUNT],
    pub rate_profiles: [RateProfile; CONTROL_RATE_PROFILE_COUNT],
}

impl Settings {
    /// The active PID profile, falling back to the first one for an invalid index.
    pub fn pid_profile(&self) -> &PidProfile {
        let index = self.system.pid_profile_index as usize;
        self.pid_profiles.get(index).unwrap_or(&self.pid_profiles[0])
    }

    /// The active rate profile, falling back to the first one for an invalid index.
    pub fn rate_profile(&self) -> &RateProfile {
        let index = self.system.active_rate_profile as usize;
        self.rate_profiles.get(index).unwrap_or(&self.rate_profiles[0])
    }

    pub fn is_configured(&self) -> bool {
        self.system.configuration_state == ConfigurationState::Configured
    }
}

/// Compiled defaults, not yet adjusted for any target. See [`crate::registry::reset_all`].
impl Default for Settings {
    fn default() -> Self {
        Self {
            pilot: PilotConfig::default(),
            system: SystemConfig::default(),
            features: FeatureSet::default(),
            serial: SerialConfig::default(),
            rx: RxConfig::default(),
            motor: MotorConfig::default(),
            gyro: GyroConfig::default(),
            pid: PidConfig::default(),
            accelerometer: AccelerometerConfig::default(),
            throttle_correction: ThrottleCorrectionConfig::default(),
            gps: GpsConfig::default(),
            failsafe: FailsafeConfig::default(),
            modes: ModeActivations::default(),
            beeper: BeeperConfig::default(),
            blackbox: BlackboxConfig::default(),
            vtx: VtxSettings::default(),
            vtx_table: VtxTable::default(),
            pid_profiles: core::array::from_fn(|_| PidProfile::default()),
            rate_profiles: core::array::from_fn(|_| RateProfile::default()),
        }
    }
}
