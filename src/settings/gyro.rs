use serde::{Deserialize, Serialize};

pub const MAX_GYRO_SYNC_DENOM: u8 = 32;
pub const MAX_PID_PROCESS_DENOM: u8 = 16;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GyroHardwareLpf {
    #[default]
    Normal,
    /// sensor internal lowpass with 1kHz sampling, forces both loop denominators to 1
    OneKhzSample,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GyroConfig {
    pub hardware_lpf: GyroHardwareLpf,
    /// gyro loop runs every n-th sample
    pub sync_denom: u8,
    /// first software lowpass cutoff (Hz), 0 is off
    pub lowpass_hz: u16,
    /// second software lowpass cutoff (Hz), 0 is off
    pub lowpass2_hz: u16,
    pub soft_notch_hz_1: u16,
    pub soft_notch_cutoff_1: u16,
    pub soft_notch_hz_2: u16,
    pub soft_notch_cutoff_2: u16,
    /// lower bound of the dynamic gyro lowpass (Hz), 0 disables it
    pub dyn_lpf_min_hz: u16,
    pub dyn_lpf_max_hz: u16,
}

impl Default for GyroConfig {
    fn default() -> Self {
        Self {
            hardware_lpf: GyroHardwareLpf::default(),
            sync_denom: 1,
            lowpass_hz: 200,
            lowpass2_hz: 250,
            soft_notch_hz_1: 0,
            soft_notch_cutoff_1: 0,
            soft_notch_hz_2: 0,
            soft_notch_cutoff_2: 0,
            dyn_lpf_min_hz: 200,
            dyn_lpf_max_hz: 500,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PidConfig {
    /// control loop runs every n-th gyro loop
    pub pid_process_denom: u8,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self { pid_process_denom: 2 }
    }
}

/// Accelerometer settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AccelerometerConfig {
    /// calibration offsets, subtracted from raw readings
    pub acc_zero: nalgebra::Vector3<i16>,
    /// accelerometer lowpass cutoff (Hz)
    pub acc_lpf_hz: u16,
}

impl Default for AccelerometerConfig {
    fn default() -> Self {
        Self { acc_zero: nalgebra::Vector3::zeros(), acc_lpf_hz: 10 }
    }
}

/// Throttle compensation for tilt, used by the attitude estimator.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ThrottleCorrectionConfig {
    /// tilt angle at which the full correction applies (deci-degrees)
    pub throttle_correction_angle: u16,
    /// amount of throttle added at full correction (µs)
    pub throttle_correction_value: u8,
}

impl Default for ThrottleCorrectionConfig {
    fn default() -> Self {
        Self { throttle_correction_angle: 800, throttle_correction_value: 0 }
    }
}
