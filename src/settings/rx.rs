use serde::{Deserialize, Serialize};

/// Which channels RC smoothing interpolates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterpolationChannels {
    Rp,
    Rpy,
    #[default]
    Rpyt,
    T,
    Rpt,
}

impl InterpolationChannels {
    pub fn includes_yaw(self) -> bool {
        matches!(self, Self::Rpy | Self::Rpyt)
    }

    pub fn includes_throttle(self) -> bool {
        matches!(self, Self::Rpyt | Self::T | Self::Rpt)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RxConfig {
    /// channel carrying RSSI, 0 if none
    pub rssi_channel: u8,
    /// derive RSSI from the frame error rate of the serial receiver
    pub rssi_src_frame_errors: bool,
    pub rc_smoothing: bool,
    pub rc_interpolation_channels: InterpolationChannels,
    pub midrc: u16,
    pub mincheck: u16,
    pub maxcheck: u16,
}

impl Default for RxConfig {
    fn default() -> Self {
        Self {
            rssi_channel: 0,
            rssi_src_frame_errors: false,
            rc_smoothing: true,
            rc_interpolation_channels: InterpolationChannels::default(),
            midrc: 1500,
            mincheck: 1050,
            maxcheck: 1900,
        }
    }
}
