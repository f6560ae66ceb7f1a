//! PID and rate profiles. Both are stored as fixed size arrays of which one entry is active.

use serde::{Deserialize, Serialize};

pub const PID_PROFILE_COUNT: usize = 4;
pub const CONTROL_RATE_PROFILE_COUNT: usize = 6;
pub const MAX_PROFILE_NAME_LENGTH: usize = 8;

pub const MAX_AUTO_DETECT_CELL_COUNT: i8 = 8;
/// Raw value of [`CellCountSelector::Stay`].
pub const AUTO_PROFILE_CELL_COUNT_STAY: i8 = 0;
/// Raw value of [`CellCountSelector::Change`].
pub const AUTO_PROFILE_CELL_COUNT_CHANGE: i8 = -1;

pub const AXIS_COUNT: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Roll = 0,
    Pitch = 1,
    Yaw = 2,
}

impl Axis {
    pub const ALL: [Axis; AXIS_COUNT] = [Axis::Roll, Axis::Pitch, Axis::Yaw];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Battery cell count preference of a PID profile, used for automatic profile selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellCountSelector {
    /// no preference, the profile may always be switched away from
    Change,
    /// never switch away from this profile automatically, fallback target for switching
    Stay,
    /// profile for exactly this many cells (1..=8)
    Exact(u8),
}

impl CellCountSelector {
    /// Decodes the stored byte, `None` if it is outside `-1..=8`.
    pub fn from_raw(raw: i8) -> Option<Self> {
        match raw {
            AUTO_PROFILE_CELL_COUNT_CHANGE => Some(Self::Change),
            AUTO_PROFILE_CELL_COUNT_STAY => Some(Self::Stay),
            1..=MAX_AUTO_DETECT_CELL_COUNT => Some(Self::Exact(raw as u8)),
            _ => None,
        }
    }

    pub fn raw(self) -> i8 {
        match self {
            Self::Change => AUTO_PROFILE_CELL_COUNT_CHANGE,
            Self::Stay => AUTO_PROFILE_CELL_COUNT_STAY,
            Self::Exact(cells) => cells as i8,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PidGains {
    pub p: u8,
    pub i: u8,
    pub d: u8,
    /// feed-forward gain
    pub f: u16,
}

impl PidGains {
    const fn new(p: u8, i: u8, d: u8, f: u16) -> Self {
        Self { p, i, d, f }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PidProfile {
    pub name: heapless::String<MAX_PROFILE_NAME_LENGTH>,
    /// gains for roll, pitch and yaw
    pub pid: [PidGains; AXIS_COUNT],
    /// D gain used while not in sharp manoeuvres, 0 disables the feature
    pub d_min: [u8; AXIS_COUNT],
    /// first D-term lowpass cutoff (Hz), 0 is off
    pub dterm_lowpass_hz: u16,
    /// second D-term lowpass cutoff (Hz), 0 is off
    pub dterm_lowpass2_hz: u16,
    /// D-term notch center frequency (Hz), 0 is off
    pub dterm_notch_hz: u16,
    /// D-term notch cutoff frequency (Hz), has to be below the center
    pub dterm_notch_cutoff: u16,
    /// lower bound of the dynamic D-term lowpass (Hz), 0 disables it
    pub dyn_lpf_dterm_min_hz: u16,
    pub dyn_lpf_dterm_max_hz: u16,
    /// scaling of the motor output range (%)
    pub motor_output_limit: u8,
    /// raw [`CellCountSelector`]
    pub auto_profile_cell_count: i8,
    pub throttle_boost: u8,
    pub anti_gravity_gain: u16,
}

impl PidProfile {
    pub fn cell_count_selector(&self) -> Option<CellCountSelector> {
        CellCountSelector::from_raw(self.auto_profile_cell_count)
    }
}

impl Default for PidProfile {
    fn default() -> Self {
        Self {
            name: heapless::String::new(),
            pid: [
                PidGains::new(42, 85, 35, 90),
                PidGains::new(46, 90, 38, 95),
                PidGains::new(45, 90, 0, 90),
            ],
            d_min: [23, 25, 0],
            dterm_lowpass_hz: 150,
            dterm_lowpass2_hz: 150,
            dterm_notch_hz: 0,
            dterm_notch_cutoff: 0,
            dyn_lpf_dterm_min_hz: 70,
            dyn_lpf_dterm_max_hz: 170,
            motor_output_limit: 100,
            auto_profile_cell_count: AUTO_PROFILE_CELL_COUNT_STAY,
            throttle_boost: 5,
            anti_gravity_gain: 3500,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RateProfile {
    pub name: heapless::String<MAX_PROFILE_NAME_LENGTH>,
    pub rc_rates: [u8; AXIS_COUNT],
    pub rc_expo: [u8; AXIS_COUNT],
    /// "super rates", stick deflection dependent rate increase
    pub rates: [u8; AXIS_COUNT],
    pub throttle_mid: u8,
    pub throttle_expo: u8,
    /// throttle PID attenuation (%)
    pub tpa_rate: u8,
    /// throttle value above which TPA starts (µs)
    pub tpa_breakpoint: u16,
}

impl Default for RateProfile {
    fn default() -> Self {
        Self {
            name: heapless::String::new(),
            rc_rates: [100; AXIS_COUNT],
            rc_expo: [0; AXIS_COUNT],
            rates: [70; AXIS_COUNT],
            throttle_mid: 50,
            throttle_expo: 0,
            tpa_rate: 65,
            tpa_breakpoint: 1350,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_count_selector_decoding() {
        assert_eq!(CellCountSelector::from_raw(-1), Some(CellCountSelector::Change));
        assert_eq!(CellCountSelector::from_raw(0), Some(CellCountSelector::Stay));
        assert_eq!(CellCountSelector::from_raw(4), Some(CellCountSelector::Exact(4)));
        assert_eq!(CellCountSelector::from_raw(8), Some(CellCountSelector::Exact(8)));
        assert_eq!(CellCountSelector::from_raw(9), None);
        assert_eq!(CellCountSelector::from_raw(-2), None);

        for raw in -1..=8 {
            assert_eq!(CellCountSelector::from_raw(raw).unwrap().raw(), raw);
        }
    }

    #[test]
    fn default_profile_stays() {
        assert_eq!(PidProfile::default().cell_count_selector(), Some(CellCountSelector::Stay));
    }
}
