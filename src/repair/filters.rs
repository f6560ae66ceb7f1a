//! Filter frequency limits and ordering between paired filter frequencies.

use super::set;
use crate::settings::*;

/// A filter frequency field with the value it is reset to when above [`FILTER_FREQUENCY_MAX`].
struct FilterLimit<T> {
    field: fn(&mut T) -> &mut u16,
    reset: u16,
}

const fn lowpass<T>(field: fn(&mut T) -> &mut u16) -> FilterLimit<T> {
    FilterLimit { field, reset: FILTER_FREQUENCY_MAX }
}

const fn notch_center<T>(field: fn(&mut T) -> &mut u16) -> FilterLimit<T> {
    FilterLimit { field, reset: FILTER_FREQUENCY_MAX }
}

const fn notch_cutoff<T>(field: fn(&mut T) -> &mut u16) -> FilterLimit<T> {
    FilterLimit { field, reset: 0 }
}

fn dterm_lowpass(p: &mut PidProfile) -> &mut u16 {
    &mut p.dterm_lowpass_hz
}

fn dterm_lowpass2(p: &mut PidProfile) -> &mut u16 {
    &mut p.dterm_lowpass2_hz
}

fn dterm_notch(p: &mut PidProfile) -> &mut u16 {
    &mut p.dterm_notch_hz
}

fn dterm_notch_cutoff(p: &mut PidProfile) -> &mut u16 {
    &mut p.dterm_notch_cutoff
}

fn gyro_lowpass(g: &mut GyroConfig) -> &mut u16 {
    &mut g.lowpass_hz
}

fn gyro_lowpass2(g: &mut GyroConfig) -> &mut u16 {
    &mut g.lowpass2_hz
}

fn gyro_notch_1(g: &mut GyroConfig) -> &mut u16 {
    &mut g.soft_notch_hz_1
}

fn gyro_notch_cutoff_1(g: &mut GyroConfig) -> &mut u16 {
    &mut g.soft_notch_cutoff_1
}

fn gyro_notch_2(g: &mut GyroConfig) -> &mut u16 {
    &mut g.soft_notch_hz_2
}

fn gyro_notch_cutoff_2(g: &mut GyroConfig) -> &mut u16 {
    &mut g.soft_notch_cutoff_2
}

const PROFILE_LIMITS: [FilterLimit<PidProfile>; 4] = [
    lowpass(dterm_lowpass),
    lowpass(dterm_lowpass2),
    notch_center(dterm_notch),
    notch_cutoff(dterm_notch_cutoff),
];

const GYRO_LIMITS: [FilterLimit<GyroConfig>; 6] = [
    lowpass(gyro_lowpass),
    lowpass(gyro_lowpass2),
    notch_center(gyro_notch_1),
    notch_cutoff(gyro_notch_cutoff_1),
    notch_center(gyro_notch_2),
    notch_cutoff(gyro_notch_cutoff_2),
];

fn apply_limits<T>(group: &mut T, limits: &[FilterLimit<T>]) -> bool {
    let mut changed = false;
    for limit in limits {
        let field = (limit.field)(&mut *group);
        if *field > FILTER_FREQUENCY_MAX {
            *field = limit.reset;
            changed = true;
        }
    }
    changed
}

pub(super) fn clamp_filter_limits(settings: &mut Settings) -> bool {
    let mut changed = apply_limits(&mut settings.gyro, &GYRO_LIMITS);
    for profile in settings.pid_profiles.iter_mut() {
        changed |= apply_limits(profile, &PROFILE_LIMITS);
    }
    changed
}

/// Disables a notch whose cutoff is not below its center frequency.
fn fix_notch(center: &mut u16, cutoff: u16) -> bool {
    if cutoff >= *center {
        return set(center, 0);
    }
    false
}

/// Disables a dynamic lowpass whose lower bound is above its upper bound.
fn fix_dynamic_lowpass(min: &mut u16, max: u16) -> bool {
    if *min > max {
        return set(min, 0);
    }
    false
}

pub(super) fn fix_filter_ordering(settings: &mut Settings) -> bool {
    let gyro = &mut settings.gyro;
    let mut changed = fix_notch(&mut gyro.soft_notch_hz_1, gyro.soft_notch_cutoff_1);
    changed |= fix_notch(&mut gyro.soft_notch_hz_2, gyro.soft_notch_cutoff_2);
    changed |= fix_dynamic_lowpass(&mut gyro.dyn_lpf_min_hz, gyro.dyn_lpf_max_hz);

    for profile in settings.pid_profiles.iter_mut() {
        changed |= fix_notch(&mut profile.dterm_notch_hz, profile.dterm_notch_cutoff);
        changed |= fix_dynamic_lowpass(&mut profile.dyn_lpf_dterm_min_hz, profile.dyn_lpf_dterm_max_hz);

        for axis in Axis::ALL {
            let i = axis.index();
            if profile.d_min[i] >= profile.pid[i].d {
                changed |= set(&mut profile.d_min[i], 0);
            }
        }
    }

    changed
}
