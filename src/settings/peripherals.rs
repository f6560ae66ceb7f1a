//! Settings for GPS, failsafe, beeper, blackbox and video transmitter.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GpsProvider {
    Nmea,
    #[default]
    Ublox,
    /// position is received via MSP instead of a serial GPS
    Msp,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GpsConfig {
    pub provider: GpsProvider,
    pub sbas_mode: u8,
    pub auto_baud: bool,
}

impl Default for GpsConfig {
    fn default() -> Self {
        Self { provider: GpsProvider::default(), sbas_mode: 0, auto_baud: false }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailsafeProcedure {
    AutoLanding,
    #[default]
    Drop,
    GpsRescue,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FailsafeConfig {
    pub procedure: FailsafeProcedure,
    /// guard time before failsafe triggers (0.1s)
    pub delay: u8,
    /// duration of the landing phase (s)
    pub landing_time: u8,
    /// throttle during landing (µs)
    pub throttle: u16,
}

impl Default for FailsafeConfig {
    fn default() -> Self {
        Self { procedure: FailsafeProcedure::default(), delay: 4, landing_time: 60, throttle: 1000 }
    }
}

bitflags! {
    /// Events the beeper reacts to.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct BeeperModes: u32 {
        const GYRO_CALIBRATED = 1 << 0;
        const RX_LOST = 1 << 1;
        const RX_LOST_LANDING = 1 << 2;
        const DISARMING = 1 << 3;
        const ARMING = 1 << 4;
        const ARMING_GPS_FIX = 1 << 5;
        const BAT_CRIT_LOW = 1 << 6;
        const BAT_LOW = 1 << 7;
        const GPS_STATUS = 1 << 8;
        const RX_SET = 1 << 9;
        const ACC_CALIBRATION = 1 << 10;
        const ACC_CALIBRATION_FAIL = 1 << 11;
        const READY_BEEP = 1 << 12;
        const MULTI_BEEPS = 1 << 13;
        const DISARM_REPEAT = 1 << 14;
        const ARMED = 1 << 15;
        const SYSTEM_INIT = 1 << 16;
        const USB = 1 << 17;
        const BLACKBOX_ERASE = 1 << 18;
        const CRASH_FLIP_MODE = 1 << 19;
        const CAM_CONNECTION_OPEN = 1 << 20;
        const CAM_CONNECTION_CLOSE = 1 << 21;
        const RC_SMOOTHING_INIT_FAIL = 1 << 22;
    }
}

impl BeeperModes {
    /// Events for which the DShot beacon can be switched off.
    pub const DSHOT_BEACON_ALLOWED: BeeperModes =
        BeeperModes::from_bits_retain(BeeperModes::RX_LOST.bits() | BeeperModes::RX_SET.bits());
}

pub const DSHOT_BEACON_TONE_MIN: u8 = 1;
pub const DSHOT_BEACON_TONE_MAX: u8 = 5;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BeeperConfig {
    /// raw [`BeeperModes`] mask of silenced events
    pub beeper_off_flags: u32,
    /// raw [`BeeperModes`] mask of events that do not trigger the DShot beacon
    pub dshot_beacon_off_flags: u32,
    pub dshot_beacon_tone: u8,
}

impl Default for BeeperConfig {
    fn default() -> Self {
        Self { beeper_off_flags: 0, dshot_beacon_off_flags: 0, dshot_beacon_tone: DSHOT_BEACON_TONE_MIN }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlackboxDevice {
    None,
    #[default]
    Flash,
    Sdcard,
    Serial,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BlackboxConfig {
    pub device: BlackboxDevice,
    /// log every 2^n-th control loop iteration
    pub sample_rate: u8,
    pub record_acc: bool,
}

impl Default for BlackboxConfig {
    fn default() -> Self {
        Self { device: BlackboxDevice::default(), sample_rate: 1, record_acc: true }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct VtxSettings {
    /// band index (1 based), 0 if the frequency is set directly
    pub band: u8,
    /// channel index within the band (1 based)
    pub channel: u8,
    /// power level index (1 based)
    pub power: u8,
    /// frequency (MHz)
    pub freq: u16,
    pub pit_mode_freq: u16,
    pub low_power_disarm: bool,
}

/// Dimensions of the VTX band/channel/power table.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VtxTable {
    pub bands: u8,
    pub channels: u8,
    pub power_levels: u8,
}

impl Default for VtxTable {
    fn default() -> Self {
        Self { bands: 5, channels: 8, power_levels: 5 }
    }
}
