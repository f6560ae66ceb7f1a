use serde::{Deserialize, Serialize};

/// Maximum length of the target board identifier.
pub const BOARD_IDENTIFIER_LENGTH: usize = 4;
pub const MAX_NAME_LENGTH: usize = 16;

/// Whether the store was ever explicitly saved by a user.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConfigurationState {
    /// compiled defaults, never saved by a user
    #[default]
    DefaultsBare,
    Configured,
}

/// Scheduler rate optimisation. Enabling it is a prerequisite for bidirectional DShot.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum SchedulerOptimizeRate {
    Off,
    On,
    /// on, but only if DShot telemetry is used
    #[default]
    Auto,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SystemConfig {
    /// index into the PID profile array
    pub pid_profile_index: u8,
    /// index into the rate profile array
    pub active_rate_profile: u8,
    pub configuration_state: ConfigurationState,
    pub scheduler_optimize_rate: SchedulerOptimizeRate,
    pub board_identifier: heapless::String<BOARD_IDENTIFIER_LENGTH>,
    /// time after power-on during which arming is refused (s)
    pub power_on_arming_grace_time: u8,
    pub debug_mode: u8,
    pub task_statistics: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            pid_profile_index: 0,
            active_rate_profile: 0,
            configuration_state: ConfigurationState::default(),
            scheduler_optimize_rate: SchedulerOptimizeRate::default(),
            board_identifier: heapless::String::new(),
            power_on_arming_grace_time: 5,
            debug_mode: 0,
            task_statistics: true,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PilotConfig {
    /// craft name, shown on the OSD
    pub name: heapless::String<MAX_NAME_LENGTH>,
    pub display_name: heapless::String<MAX_NAME_LENGTH>,
}
