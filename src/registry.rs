//! Table of settings groups: stable id, schema version, compiled default and storage codec.
//!
//! Group ids and versions are part of the storage format. A group's version has to be bumped
//! whenever its serialized layout changes, stored records with another version are ignored and
//! the group keeps its defaults.

use core::fmt;

use log::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use strum::{Display, EnumIter, FromRepr};

use crate::settings::*;
use crate::target::Target;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, FromRepr, Display)]
#[repr(u16)]
pub enum GroupId {
    Pilot = 1,
    System = 2,
    Features = 3,
    Serial = 4,
    Rx = 5,
    Motor = 6,
    Gyro = 7,
    Pid = 8,
    Accelerometer = 9,
    ThrottleCorrection = 10,
    Gps = 11,
    Failsafe = 12,
    ModeActivations = 13,
    Beeper = 14,
    Blackbox = 15,
    Vtx = 16,
    VtxTable = 17,
    PidProfiles = 18,
    RateProfiles = 19,
}

pub struct GroupDescriptor {
    pub id: GroupId,
    pub version: u8,
    reset: fn(&mut Settings, &Target),
    encode: fn(&Settings, &mut [u8]) -> postcard::Result<usize>,
    decode: fn(&mut Settings, &[u8]) -> postcard::Result<()>,
}

impl GroupDescriptor {
    pub fn reset(&self, settings: &mut Settings, target: &Target) {
        (self.reset)(settings, target)
    }

    /// Serializes the group into `buffer`, returning the number of bytes used.
    pub fn encode(&self, settings: &Settings, buffer: &mut [u8]) -> postcard::Result<usize> {
        (self.encode)(settings, buffer)
    }

    /// Replaces the group with the deserialized payload. The group is untouched on error.
    pub fn decode(&self, settings: &mut Settings, payload: &[u8]) -> postcard::Result<()> {
        (self.decode)(settings, payload)
    }
}

impl fmt::Debug for GroupDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupDescriptor").field("id", &self.id).field("version", &self.version).finish()
    }
}

/// Error returned by a target's custom defaults builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefaultsError {
    /// the target has no custom defaults
    Unavailable,
    /// the custom defaults could not be applied
    Invalid(&'static str),
}

impl fmt::Display for DefaultsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "no custom defaults available"),
            Self::Invalid(reason) => write!(f, "invalid custom defaults: {}", reason),
        }
    }
}

#[cfg(not(target_os = "none"))]
impl std::error::Error for DefaultsError {}

fn encode<T: Serialize>(value: &T, buffer: &mut [u8]) -> postcard::Result<usize> {
    postcard::to_slice(value, buffer).map(|bytes| bytes.len())
}

fn decode<T: DeserializeOwned>(field: &mut T, payload: &[u8]) -> postcard::Result<()> {
    *field = postcard::from_bytes(payload)?;
    Ok(())
}

pub const GROUP_COUNT: usize = 19;

pub static GROUPS: [GroupDescriptor; GROUP_COUNT] = [
    GroupDescriptor {
        id: GroupId::Pilot,
        version: 1,
        reset: |s, _| s.pilot = PilotConfig::default(),
        encode: |s, buf| encode(&s.pilot, buf),
        decode: |s, bytes| decode(&mut s.pilot, bytes),
    },
    GroupDescriptor {
        id: GroupId::System,
        version: 2,
        reset: |s, target| {
            s.system = SystemConfig { board_identifier: target.board_identifier.clone(), ..Default::default() }
        },
        encode: |s, buf| encode(&s.system, buf),
        decode: |s, bytes| decode(&mut s.system, bytes),
    },
    GroupDescriptor {
        id: GroupId::Features,
        version: 1,
        reset: |s, target| s.features = target.default_features | target.default_rx_feature,
        encode: |s, buf| encode(&s.features, buf),
        decode: |s, bytes| decode(&mut s.features, bytes),
    },
    GroupDescriptor {
        id: GroupId::Serial,
        version: 1,
        reset: |s, _| s.serial = SerialConfig::default(),
        encode: |s, buf| encode(&s.serial, buf),
        decode: |s, bytes| decode(&mut s.serial, bytes),
    },
    GroupDescriptor {
        id: GroupId::Rx,
        version: 1,
        reset: |s, _| s.rx = RxConfig::default(),
        encode: |s, buf| encode(&s.rx, buf),
        decode: |s, bytes| decode(&mut s.rx, bytes),
    },
    GroupDescriptor {
        id: GroupId::Motor,
        version: 1,
        reset: |s, _| s.motor = MotorConfig::default(),
        encode: |s, buf| encode(&s.motor, buf),
        decode: |s, bytes| decode(&mut s.motor, bytes),
    },
    GroupDescriptor {
        id: GroupId::Gyro,
        version: 1,
        reset: |s, _| s.gyro = GyroConfig::default(),
        encode: |s, buf| encode(&s.gyro, buf),
        decode: |s, bytes| decode(&mut s.gyro, bytes),
    },
    GroupDescriptor {
        id: GroupId::Pid,
        version: 1,
        reset: |s, _| s.pid = PidConfig::default(),
        encode: |s, buf| encode(&s.pid, buf),
        decode: |s, bytes| decode(&mut s.pid, bytes),
    },
    GroupDescriptor {
        id: GroupId::Accelerometer,
        version: 1,
        reset: |s, _| s.accelerometer = AccelerometerConfig::default(),
        encode: |s, buf| encode(&s.accelerometer, buf),
        decode: |s, bytes| decode(&mut s.accelerometer, bytes),
    },
    GroupDescriptor {
        id: GroupId::ThrottleCorrection,
        version: 1,
        reset: |s, _| s.throttle_correction = ThrottleCorrectionConfig::default(),
        encode: |s, buf| encode(&s.throttle_correction, buf),
        decode: |s, bytes| decode(&mut s.throttle_correction, bytes),
    },
    GroupDescriptor {
        id: GroupId::Gps,
        version: 1,
        reset: |s, _| s.gps = GpsConfig::default(),
        encode: |s, buf| encode(&s.gps, buf),
        decode: |s, bytes| decode(&mut s.gps, bytes),
    },
    GroupDescriptor {
        id: GroupId::Failsafe,
        version: 1,
        reset: |s, _| s.failsafe = FailsafeConfig::default(),
        encode: |s, buf| encode(&s.failsafe, buf),
        decode: |s, bytes| decode(&mut s.failsafe, bytes),
    },
    GroupDescriptor {
        id: GroupId::ModeActivations,
        version: 1,
        reset: |s, _| s.modes = ModeActivations::default(),
        encode: |s, buf| encode(&s.modes, buf),
        decode: |s, bytes| decode(&mut s.modes, bytes),
    },
    GroupDescriptor {
        id: GroupId::Beeper,
        version: 1,
        reset: |s, _| s.beeper = BeeperConfig::default(),
        encode: |s, buf| encode(&s.beeper, buf),
        decode: |s, bytes| decode(&mut s.beeper, bytes),
    },
    GroupDescriptor {
        id: GroupId::Blackbox,
        version: 1,
        reset: |s, _| s.blackbox = BlackboxConfig::default(),
        encode: |s, buf| encode(&s.blackbox, buf),
        decode: |s, bytes| decode(&mut s.blackbox, bytes),
    },
    GroupDescriptor {
        id: GroupId::Vtx,
        version: 1,
        reset: |s, _| s.vtx = VtxSettings::default(),
        encode: |s, buf| encode(&s.vtx, buf),
        decode: |s, bytes| decode(&mut s.vtx, bytes),
    },
    GroupDescriptor {
        id: GroupId::VtxTable,
        version: 1,
        reset: |s, _| s.vtx_table = VtxTable::default(),
        encode: |s, buf| encode(&s.vtx_table, buf),
        decode: |s, bytes| decode(&mut s.vtx_table, bytes),
    },
    GroupDescriptor {
        id: GroupId::PidProfiles,
        version: 1,
        reset: |s, _| s.pid_profiles.iter_mut().for_each(reset_pid_profile),
        encode: |s, buf| encode(&s.pid_profiles, buf),
        decode: |s, bytes| decode(&mut s.pid_profiles, bytes),
    },
    GroupDescriptor {
        id: GroupId::RateProfiles,
        version: 1,
        reset: |s, _| s.rate_profiles.iter_mut().for_each(reset_rate_profile),
        encode: |s, buf| encode(&s.rate_profiles, buf),
        decode: |s, bytes| decode(&mut s.rate_profiles, bytes),
    },
];

pub fn group(id: GroupId) -> &'static GroupDescriptor {
    // the table is ordered by id, starting at 1
    &GROUPS[id as usize - 1]
}

pub fn reset_pid_profile(profile: &mut PidProfile) {
    *profile = PidProfile::default();
}

pub fn reset_rate_profile(profile: &mut RateProfile) {
    *profile = RateProfile::default();
}

/// Resets every group to its compiled default and applies the target's configuration hook.
pub fn reset_all(settings: &mut Settings, target: &Target) {
    for group in GROUPS.iter() {
        group.reset(settings, target);
    }

    if let Some(configure) = target.configure {
        debug!("Applying target configuration for {}.", target.board_identifier);
        configure(settings);
    }
}

/// Replaces the store with the target's custom defaults.
pub fn reset_to_custom_defaults(settings: &mut Settings, target: &Target) -> Result<(), DefaultsError> {
    let builder = target.custom_defaults.ok_or(DefaultsError::Unavailable)?;

    // build into a scratch copy, so a failing builder leaves the store untouched
    let mut defaults = settings.clone();
    reset_all(&mut defaults, target);
    builder(&mut defaults)?;
    *settings = defaults;
    Ok(())
}

/// Compiled defaults adjusted for `target`.
pub fn defaults(target: &Target) -> Settings {
    let mut settings = Settings::default();
    reset_all(&mut settings, target);
    settings
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn table_is_ordered_by_id() {
        assert_eq!(GROUPS.len(), GroupId::iter().count());
        for id in GroupId::iter() {
            assert_eq!(group(id).id, id);
            assert_eq!(GroupId::from_repr(id as u16), Some(id));
        }
    }

    #[test]
    fn reset_applies_target_values() {
        let mut target = Target::default();
        target.default_rx_feature = FeatureSet::RX_PPM;
        target.configure = Some(|s: &mut Settings| s.motor.motor_pole_count = 12);

        let settings = defaults(&target);
        assert_eq!(settings.system.board_identifier.as_str(), "SITL");
        assert!(settings.features.contains(FeatureSet::RX_PPM | FeatureSet::AIRMODE));
        assert_eq!(settings.motor.motor_pole_count, 12);
    }

    #[test]
    fn groups_encode_and_decode() {
        let mut settings = defaults(&Target::default());
        settings.pid_profiles[2].pid[0].p = 77;
        settings.modes.push(ModeActivationCondition::linked(BoxId::Beeper, BoxId::Arm)).unwrap();

        let mut decoded = Settings::default();
        let mut buffer = [0u8; 1024];
        for group in GROUPS.iter() {
            let len = group.encode(&settings, &mut buffer).unwrap();
            group.decode(&mut decoded, &buffer[..len]).unwrap();
        }
        assert_eq!(decoded, settings);
    }

    #[test]
    fn failing_custom_defaults_leave_store_untouched() {
        let mut target = Target::default();
        let mut settings = defaults(&target);
        settings.motor.min_throttle = 1111;

        assert_eq!(reset_to_custom_defaults(&mut settings, &target), Err(DefaultsError::Unavailable));

        target.custom_defaults = Some(|_: &mut Settings| Err(DefaultsError::Invalid("corrupt")));
        assert_eq!(reset_to_custom_defaults(&mut settings, &target), Err(DefaultsError::Invalid("corrupt")));
        assert_eq!(settings.motor.min_throttle, 1111);

        target.custom_defaults = Some(|s: &mut Settings| {
            s.motor.min_throttle = 1050;
            Ok(())
        });
        assert_eq!(reset_to_custom_defaults(&mut settings, &target), Ok(()));
        assert_eq!(settings.motor.min_throttle, 1050);
    }
}
