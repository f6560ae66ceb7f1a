use enum_map::Enum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

pub const BRUSHLESS_MOTORS_PWM_RATE: u16 = 480;
pub const BRUSHED_MOTORS_PWM_RATE: u16 = 16000;
/// Lowest valid motor command when using brushed motors (µs).
pub const BRUSHED_MIN_COMMAND: u16 = 1000;

/// Protocol used to send motor commands to the ESCs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Enum, EnumIter, EnumString, Display, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
pub enum MotorProtocol {
    /// 1-2ms pulses at up to 480 Hz
    Standard,
    Oneshot125,
    Oneshot42,
    Multishot,
    Brushed,
    Dshot150,
    Dshot300,
    #[default]
    Dshot600,
    Proshot1000,
    Disabled,
}

impl MotorProtocol {
    pub fn is_dshot(self) -> bool {
        matches!(self, Self::Dshot150 | Self::Dshot300 | Self::Dshot600 | Self::Proshot1000)
    }

    /// Protocols for which an unsynced PWM rate has to respect the minimum update interval.
    pub fn limits_unsynced_rate(self) -> bool {
        matches!(self, Self::Oneshot125 | Self::Oneshot42 | Self::Multishot | Self::Brushed)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DshotBitbang {
    Off,
    On,
    #[default]
    Auto,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MotorDevConfig {
    /// PWM rate when running unsynced (Hz)
    pub motor_pwm_rate: u16,
    pub motor_pwm_protocol: MotorProtocol,
    /// run motor output independently from the control loop
    pub use_unsynced_pwm: bool,
    pub use_burst_dshot: bool,
    /// bidirectional DShot, required for RPM filtering
    pub use_dshot_telemetry: bool,
    pub use_dshot_bitbang: DshotBitbang,
}

impl Default for MotorDevConfig {
    fn default() -> Self {
        Self {
            motor_pwm_rate: BRUSHLESS_MOTORS_PWM_RATE,
            motor_pwm_protocol: MotorProtocol::default(),
            use_unsynced_pwm: false,
            use_burst_dshot: false,
            use_dshot_telemetry: false,
            use_dshot_bitbang: DshotBitbang::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MotorConfig {
    pub dev: MotorDevConfig,
    /// motor command while armed at zero throttle (µs)
    pub min_throttle: u16,
    pub max_throttle: u16,
    /// motor command while disarmed (µs)
    pub min_command: u16,
    pub motor_pole_count: u8,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            dev: MotorDevConfig::default(),
            min_throttle: 1070,
            max_throttle: 2000,
            min_command: 1000,
            motor_pole_count: 14,
        }
    }
}
