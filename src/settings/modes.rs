//! Flight mode activation by auxiliary channel ranges.

use serde::{Deserialize, Serialize};

pub const MAX_MODE_ACTIVATION_CONDITION_COUNT: usize = 20;

/// Modes that can be activated from an auxiliary channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoxId {
    Arm,
    Angle,
    Horizon,
    Mag,
    Headfree,
    Passthru,
    Failsafe,
    GpsRescue,
    AntiGravity,
    Beeper,
    LedLow,
    Osd,
    Telemetry,
    Blackbox,
    Airmode,
    FlipOverAfterCrash,
    Prearm,
    BeeperMute,
    User1,
    User2,
}

/// Channel range in steps of 25µs starting at 900µs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRange {
    pub start_step: u8,
    pub end_step: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeActivationCondition {
    pub mode: BoxId,
    pub aux_channel_index: u8,
    pub range: ChannelRange,
    /// mode whose activation state this condition mirrors instead of its own range
    pub linked_to: Option<BoxId>,
}

impl ModeActivationCondition {
    pub fn new(mode: BoxId, aux_channel_index: u8, range: ChannelRange) -> Self {
        Self { mode, aux_channel_index, range, linked_to: None }
    }

    pub fn linked(mode: BoxId, linked_to: BoxId) -> Self {
        Self { mode, aux_channel_index: 0, range: ChannelRange::default(), linked_to: Some(linked_to) }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModeActivations {
    conditions: heapless::Vec<ModeActivationCondition, MAX_MODE_ACTIVATION_CONDITION_COUNT>,
}

impl ModeActivations {
    pub fn iter(&self) -> impl Iterator<Item = &ModeActivationCondition> {
        self.conditions.iter()
    }

    pub fn get(&self, index: usize) -> Option<&ModeActivationCondition> {
        self.conditions.get(index)
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Adds a condition, handing it back if the list is full.
    pub fn push(&mut self, condition: ModeActivationCondition) -> Result<(), ModeActivationCondition> {
        self.conditions.push(condition)
    }

    pub fn is_present(&self, mode: BoxId) -> bool {
        self.conditions.iter().any(|c| c.mode == mode)
    }

    /// Whether any condition for `mode` is linked to another mode.
    pub fn is_linked(&self, mode: BoxId) -> bool {
        self.conditions.iter().any(|c| c.mode == mode && c.linked_to.is_some())
    }

    /// Removes every condition for `mode`, returns whether anything was removed.
    pub fn remove(&mut self, mode: BoxId) -> bool {
        let before = self.conditions.len();
        self.conditions.retain(|c| c.mode != mode);
        self.conditions.len() != before
    }
}
