//! Validation and repair of the settings store.
//!
//! Settings written by older firmware or by external tools may violate constraints between
//! fields. [`validate_and_fix`] rewrites the store in place into a consistent, activatable state.
//! It never fails, does no I/O and does not allocate. Running it twice changes nothing the second
//! time.

mod filters;
mod motor;
mod peripherals;
mod ranges;

use bitflags::bitflags;

use crate::settings::*;
use crate::target::{Capabilities, Target};
use crate::timing::SensorModel;

bitflags! {
    /// Rule categories that changed something during a repair pass.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct RepairReport: u16 {
        const SERIAL_PORTS = 1 << 0;
        const CAPABILITIES = 1 << 1;
        const RX_EXCLUSION = 1 << 2;
        const FILTER_LIMITS = 1 << 3;
        const FILTER_ORDERING = 1 << 4;
        const RANGES = 1 << 5;
        const MOTOR_PROTOCOL = 1 << 6;
        const LOOP_TIMING = 1 << 7;
        const PERIPHERALS = 1 << 8;
        const MODE_LINKS = 1 << 9;
        const PROFILE_INDICES = 1 << 10;
    }
}

/// Assigns `value` to `field`, returns whether the field changed.
fn set<T: PartialEq>(field: &mut T, value: T) -> bool {
    if *field == value {
        return false;
    }
    *field = value;
    true
}

/// Clears `features` from the set, returns whether any of them were enabled.
fn disable(set: &mut FeatureSet, features: FeatureSet) -> bool {
    let enabled = set.intersects(features);
    set.remove(features);
    enabled
}

/// Repairs every cross-field inconsistency, see the module documentation.
pub fn validate_and_fix(settings: &mut Settings, target: &Target, sensor: SensorModel) -> RepairReport {
    let mut report = RepairReport::empty();
    report.set(RepairReport::SERIAL_PORTS, repair_serial_ports(&mut settings.serial));
    report.set(RepairReport::CAPABILITIES, disable_unsupported(settings, target.capabilities));
    report.set(RepairReport::RX_EXCLUSION, select_single_rx_input(&mut settings.features, target));
    report.set(RepairReport::FILTER_LIMITS, filters::clamp_filter_limits(settings));
    report.set(RepairReport::FILTER_ORDERING, filters::fix_filter_ordering(settings));
    report.set(RepairReport::RANGES, ranges::fix_ranges(settings, target.capabilities));
    report.set(RepairReport::MOTOR_PROTOCOL, motor::fix_protocol_settings(settings));
    report.set(RepairReport::LOOP_TIMING, motor::fix_loop_timing(settings, sensor));
    report.set(RepairReport::PERIPHERALS, peripherals::fix_peripherals(settings, target.capabilities));
    report.set(RepairReport::MODE_LINKS, fix_mode_links(&mut settings.modes));
    report.set(RepairReport::PROFILE_INDICES, fix_profile_indices(&mut settings.system));
    report
}

fn repair_serial_ports(serial: &mut SerialConfig) -> bool {
    if serial.is_valid() {
        return false;
    }

    *serial = SerialConfig::default();
    true
}

fn disable_unsupported(settings: &mut Settings, capabilities: Capabilities) -> bool {
    let mut changed = disable(&mut settings.features, capabilities.unsupported_features());

    let blackbox = &mut settings.blackbox.device;
    let unsupported_device = match *blackbox {
        BlackboxDevice::Flash => !capabilities.contains(Capabilities::FLASHFS),
        BlackboxDevice::Sdcard => !capabilities.contains(Capabilities::SDCARD),
        _ => false,
    };
    if unsupported_device {
        changed |= set(blackbox, BlackboxDevice::None);
    }

    if !capabilities.contains(Capabilities::DSHOT_TELEMETRY) {
        changed |= set(&mut settings.motor.dev.use_dshot_telemetry, false);
    }

    changed
}

/// Keeps the highest priority radio input, or enables the target's default if there is none.
/// Software SPI occupies the pins of PPM, parallel PWM and soft serial, those are cleared first
/// and never chosen as default.
fn select_single_rx_input(features: &mut FeatureSet, target: &Target) -> bool {
    let excluded = match features.contains(FeatureSet::SOFTSPI) {
        true => SOFTSPI_EXCLUDED,
        false => FeatureSet::empty(),
    };
    let changed = disable(features, excluded);

    let default = target.default_rx_feature;
    let selected = match RX_INPUT_PRIORITY.into_iter().find(|input| features.contains(*input)) {
        Some(input) => disable(features, RX_INPUTS.difference(input)),
        None if target.capabilities.supports(default) && !excluded.intersects(default) => {
            features.insert(default);
            true
        }
        None => false,
    };
    changed | selected
}

/// Removes linked conditions that would form chains or involve arming.
fn fix_mode_links(modes: &mut ModeActivations) -> bool {
    let mut changed = false;
    while let Some(mode) = first_invalid_link(modes) {
        modes.remove(mode);
        changed = true;
    }
    changed
}

fn first_invalid_link(modes: &ModeActivations) -> Option<BoxId> {
    modes
        .iter()
        .find(|condition| match condition.linked_to {
            Some(target) => condition.mode == BoxId::Arm || target == BoxId::Arm || modes.is_linked(target),
            None => false,
        })
        .map(|condition| condition.mode)
}

fn fix_profile_indices(system: &mut SystemConfig) -> bool {
    let mut changed = false;
    if system.active_rate_profile as usize >= CONTROL_RATE_PROFILE_COUNT {
        changed |= set(&mut system.active_rate_profile, 0);
    }
    if system.pid_profile_index as usize >= PID_PROFILE_COUNT {
        changed |= set(&mut system.pid_profile_index, 0);
    }
    changed
}
