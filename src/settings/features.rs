//! Feature flags. Stored as a single 32 bit mask, bit positions are part of the storage format.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct FeatureSet: u32 {
        /// receiver input via PPM sum signal
        const RX_PPM = 1 << 0;
        const INFLIGHT_ACC_CAL = 1 << 2;
        /// receiver input via a serial protocol (SBUS, CRSF, ...)
        const RX_SERIAL = 1 << 3;
        const MOTOR_STOP = 1 << 4;
        const SERVO_TILT = 1 << 5;
        const SOFTSERIAL = 1 << 6;
        const GPS = 1 << 7;
        const RANGEFINDER = 1 << 9;
        const TELEMETRY = 1 << 10;
        /// reversible motors
        const THREE_D = 1 << 12;
        /// receiver input via one PWM signal per channel
        const RX_PARALLEL_PWM = 1 << 13;
        /// receiver input via MSP from a companion device
        const RX_MSP = 1 << 14;
        const RSSI_ADC = 1 << 15;
        const LED_STRIP = 1 << 16;
        const DASHBOARD = 1 << 17;
        const OSD = 1 << 18;
        const CHANNEL_FORWARDING = 1 << 20;
        const TRANSPONDER = 1 << 21;
        const AIRMODE = 1 << 22;
        /// receiver input via an on-board SPI radio
        const RX_SPI = 1 << 25;
        const SOFTSPI = 1 << 26;
        const ESC_SENSOR = 1 << 27;
        const ANTI_GRAVITY = 1 << 28;
        const DYNAMIC_FILTER = 1 << 29;
    }
}

/// Radio input methods in the order in which they win against each other.
pub const RX_INPUT_PRIORITY: [FeatureSet; 5] = [
    FeatureSet::RX_PPM,
    FeatureSet::RX_MSP,
    FeatureSet::RX_SERIAL,
    FeatureSet::RX_SPI,
    FeatureSet::RX_PARALLEL_PWM,
];

/// All radio input methods. At most one of them may be enabled.
pub const RX_INPUTS: FeatureSet = FeatureSet::from_bits_retain(
    FeatureSet::RX_PPM.bits()
        | FeatureSet::RX_MSP.bits()
        | FeatureSet::RX_SERIAL.bits()
        | FeatureSet::RX_SPI.bits()
        | FeatureSet::RX_PARALLEL_PWM.bits(),
);

/// Features sharing their pins with software SPI.
pub const SOFTSPI_EXCLUDED: FeatureSet = FeatureSet::from_bits_retain(
    FeatureSet::RX_PPM.bits() | FeatureSet::RX_PARALLEL_PWM.bits() | FeatureSet::SOFTSERIAL.bits(),
);

impl FeatureSet {
    /// The currently enabled radio input method, if exactly one is enabled.
    pub fn rx_input(&self) -> Option<FeatureSet> {
        let enabled = self.intersection(RX_INPUTS);
        RX_INPUT_PRIORITY.into_iter().find(|f| *f == enabled)
    }
}

impl Default for FeatureSet {
    fn default() -> Self {
        FeatureSet::empty()
    }
}
