//! Description of the hardware target: what it can do and how its defaults differ from the
//! generic ones. Resolved once at startup and handed to the repair engine and the registry.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::registry::DefaultsError;
use crate::settings::{FeatureSet, Settings, BOARD_IDENTIFIER_LENGTH};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Capabilities: u32 {
        const PPM = 1 << 0;
        const SERIAL_RX = 1 << 1;
        const PWM_RX = 1 << 2;
        const RX_MSP = 1 << 3;
        const RX_SPI = 1 << 4;
        const SOFTSERIAL = 1 << 5;
        const SOFTSPI = 1 << 6;
        const RANGEFINDER = 1 << 7;
        const TELEMETRY = 1 << 8;
        const LED_STRIP = 1 << 9;
        const LED_STRIP_STATUS_MODE = 1 << 10;
        const DASHBOARD = 1 << 11;
        const OSD = 1 << 12;
        const SERVOS = 1 << 13;
        const TRANSPONDER = 1 << 14;
        const ESC_SENSOR = 1 << 15;
        /// FFT based gyro noise analysis, required by the dynamic notch
        const GYRO_DATA_ANALYSE = 1 << 16;
        const ADC = 1 << 17;
        const GPS = 1 << 18;
        const GPS_RESCUE = 1 << 19;
        const DSHOT_TELEMETRY = 1 << 20;
        const FLASHFS = 1 << 21;
        const SDCARD = 1 << 22;
        const ACC = 1 << 23;
        const VTX_TABLE = 1 << 24;
    }
}

/// Features and the capability each of them needs.
const FEATURE_REQUIREMENTS: [(FeatureSet, Capabilities); 19] = [
    (FeatureSet::RX_PPM, Capabilities::PPM),
    (FeatureSet::RX_SERIAL, Capabilities::SERIAL_RX),
    (FeatureSet::RX_PARALLEL_PWM, Capabilities::PWM_RX),
    (FeatureSet::RX_MSP, Capabilities::RX_MSP),
    (FeatureSet::RX_SPI, Capabilities::RX_SPI),
    (FeatureSet::SOFTSERIAL, Capabilities::SOFTSERIAL),
    (FeatureSet::SOFTSPI, Capabilities::SOFTSPI),
    (FeatureSet::RANGEFINDER, Capabilities::RANGEFINDER),
    (FeatureSet::TELEMETRY, Capabilities::TELEMETRY),
    (FeatureSet::LED_STRIP, Capabilities::LED_STRIP),
    (FeatureSet::DASHBOARD, Capabilities::DASHBOARD),
    (FeatureSet::OSD, Capabilities::OSD),
    (FeatureSet::SERVO_TILT, Capabilities::SERVOS),
    (FeatureSet::CHANNEL_FORWARDING, Capabilities::SERVOS),
    (FeatureSet::TRANSPONDER, Capabilities::TRANSPONDER),
    (FeatureSet::ESC_SENSOR, Capabilities::ESC_SENSOR),
    (FeatureSet::DYNAMIC_FILTER, Capabilities::GYRO_DATA_ANALYSE),
    (FeatureSet::RSSI_ADC, Capabilities::ADC),
    (FeatureSet::GPS, Capabilities::GPS),
];

impl Capabilities {
    /// Features that have to be forced off because their capability is missing.
    pub fn unsupported_features(self) -> FeatureSet {
        FEATURE_REQUIREMENTS
            .iter()
            .filter(|(_, capability)| !self.contains(*capability))
            .fold(FeatureSet::empty(), |acc, (feature, _)| acc | *feature)
    }

    pub fn supports(self, features: FeatureSet) -> bool {
        !self.unsupported_features().intersects(features)
    }
}

/// Hook applied after a registry reset, for targets whose defaults differ from the generic ones.
pub type ConfigureHook = fn(&mut Settings);

/// Builds a complete set of defaults, replacing the registry reset.
pub type DefaultsBuilder = fn(&mut Settings) -> Result<(), DefaultsError>;

#[derive(Clone)]
pub struct Target {
    pub board_identifier: heapless::String<BOARD_IDENTIFIER_LENGTH>,
    pub capabilities: Capabilities,
    /// radio input enabled if none is configured
    pub default_rx_feature: FeatureSet,
    /// features enabled by a reset to defaults
    pub default_features: FeatureSet,
    pub configure: Option<ConfigureHook>,
    pub custom_defaults: Option<DefaultsBuilder>,
}

impl Target {
    pub fn new(board_identifier: &str, capabilities: Capabilities) -> Self {
        let mut identifier = heapless::String::new();
        for c in board_identifier.chars().take(BOARD_IDENTIFIER_LENGTH) {
            // length is bounded by take()
            let _ = identifier.push(c);
        }

        Self {
            board_identifier: identifier,
            capabilities,
            default_rx_feature: FeatureSet::RX_SERIAL,
            default_features: FeatureSet::AIRMODE | FeatureSet::ANTI_GRAVITY | FeatureSet::DYNAMIC_FILTER,
            configure: None,
            custom_defaults: None,
        }
    }
}

impl core::fmt::Debug for Target {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Target")
            .field("board_identifier", &self.board_identifier)
            .field("capabilities", &self.capabilities)
            .field("default_rx_feature", &self.default_rx_feature)
            .field("default_features", &self.default_features)
            .field("configure", &self.configure.is_some())
            .field("custom_defaults", &self.custom_defaults.is_some())
            .finish()
    }
}

/// Host target with every capability.
impl Default for Target {
    fn default() -> Self {
        Self::new("SITL", Capabilities::all())
    }
}
