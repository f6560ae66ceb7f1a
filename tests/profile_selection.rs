mod common;

use common::*;

use fc_config::settings::*;

fn with_selectors(selectors: [i8; PID_PROFILE_COUNT], active: u8) -> TestDevice {
    let mut device = loaded_device();
    for (profile, selector) in device.settings_mut().pid_profiles.iter_mut().zip(selectors) {
        profile.auto_profile_cell_count = selector;
    }
    device.settings_mut().system.pid_profile_index = active;
    device.write().unwrap();
    device.load_and_activate();
    device.platform_mut().clear();
    device
}

const CHANGE: i8 = AUTO_PROFILE_CELL_COUNT_CHANGE;
const STAY: i8 = AUTO_PROFILE_CELL_COUNT_STAY;

#[test]
fn select_pid_profile() {
    let mut device = loaded_device();
    device.select_pid_profile(2);

    assert_eq!(device.active_pid_profile_index(), 2);
    assert_eq!(device.settings().system.pid_profile_index, 2);
    assert_eq!(device.platform().acknowledgments(), vec![3]);
    assert_eq!(device.platform().count(&Call::ReinitializeControlLaw), 1);
    assert_eq!(device.platform().count(&Call::EscEndpoints), 1);
}

#[test]
fn invalid_pid_profile_still_beeps() {
    let mut device = loaded_device();
    device.select_pid_profile(1);
    device.platform_mut().clear();

    device.select_pid_profile(PID_PROFILE_COUNT as u8 + 3);
    assert_eq!(device.active_pid_profile_index(), 1);
    assert_eq!(device.platform().calls, vec![Call::Acknowledge(PID_PROFILE_COUNT as u16 + 4)]);
}

#[test]
fn pid_profile_count_is_out_of_range() {
    let mut device = loaded_device();
    device.select_pid_profile(2);
    device.platform_mut().clear();

    device.select_pid_profile(PID_PROFILE_COUNT as u8);
    assert_eq!(device.active_pid_profile_index(), 2);
    assert_eq!(device.settings().system.pid_profile_index, 2);
    assert_eq!(device.platform().count(&Call::ReinitializeControlLaw), 0);
    assert_eq!(device.platform().acknowledgments(), vec![PID_PROFILE_COUNT as u16 + 1]);
}

#[test]
fn pid_selection_ignores_stale_rate_index() {
    let mut device = loaded_device();
    device.select_rate_profile(2);
    device.settings_mut().system.active_rate_profile = 10;

    device.select_pid_profile(1);
    assert_eq!(device.active_pid_profile_index(), 1);
    assert_eq!(device.active_rate_profile_index(), 2);
    assert_eq!(device.current_rate_profile(), &device.settings().rate_profiles[2]);
}

#[test]
fn rate_selection_ignores_stale_pid_index() {
    let mut device = loaded_device();
    device.select_pid_profile(3);
    device.settings_mut().system.pid_profile_index = 9;

    device.select_rate_profile(1);
    assert_eq!(device.active_rate_profile_index(), 1);
    assert_eq!(device.active_pid_profile_index(), 3);

    device.settings_mut().pid_profiles[3].auto_profile_cell_count = CHANGE;
    device.settings_mut().pid_profiles[0].auto_profile_cell_count = 4;
    device.auto_select_pid_profile_by_cell_count(4);
    assert_eq!(device.active_pid_profile_index(), 0);
    assert_eq!(device.current_pid_profile(), &device.settings().pid_profiles[0]);
}

#[test]
fn select_rate_profile() {
    let mut device = loaded_device();
    device.select_rate_profile(4);

    assert_eq!(device.active_rate_profile_index(), 4);
    assert_eq!(device.settings().system.active_rate_profile, 4);
    assert_eq!(device.platform().calls, vec![Call::LoadRateProfile(4), Call::InitRcProcessing]);
}

#[test]
fn invalid_rate_profile_is_ignored() {
    let mut device = loaded_device();
    device.select_rate_profile(CONTROL_RATE_PROFILE_COUNT as u8);

    assert_eq!(device.active_rate_profile_index(), 0);
    assert!(device.platform().calls.is_empty());
}

#[test]
fn profile_selection_survives_reload() {
    let mut device = loaded_device();
    device.select_pid_profile(3);
    device.select_rate_profile(5);
    device.write().unwrap();
    device.load_and_activate();

    assert_eq!(device.active_pid_profile_index(), 3);
    assert_eq!(device.active_rate_profile_index(), 5);
    assert_eq!(device.current_rate_profile(), &device.settings().rate_profiles[5]);
}

#[test]
fn matching_profile_is_kept() {
    let mut device = with_selectors([4, 6, STAY, 4], 0);
    device.auto_select_pid_profile_by_cell_count(4);

    assert_eq!(device.active_pid_profile_index(), 0);
    assert!(device.platform().calls.is_empty());
}

#[test]
fn staying_profile_is_kept() {
    let mut device = with_selectors([STAY, 6, 4, CHANGE], 0);
    device.auto_select_pid_profile_by_cell_count(6);

    assert_eq!(device.active_pid_profile_index(), 0);
    assert!(device.platform().calls.is_empty());
}

#[test]
fn exact_match_wins_over_stay() {
    let mut device = with_selectors([3, CHANGE, STAY, 6], 0);
    device.auto_select_pid_profile_by_cell_count(6);

    assert_eq!(device.active_pid_profile_index(), 3);
    assert_eq!(device.platform().acknowledgments(), vec![4]);
}

#[test]
fn first_stay_is_fallback() {
    let mut device = with_selectors([3, CHANGE, STAY, STAY], 0);
    device.auto_select_pid_profile_by_cell_count(5);

    assert_eq!(device.active_pid_profile_index(), 2);
    assert_eq!(device.platform().acknowledgments(), vec![3]);
}

#[test]
fn scan_wraps_around() {
    let mut device = with_selectors([5, 5, 3, CHANGE], 2);
    device.auto_select_pid_profile_by_cell_count(5);

    assert_eq!(device.active_pid_profile_index(), 0);
}

#[test]
fn no_candidate_keeps_profile() {
    let mut device = with_selectors([CHANGE, 4, 3, CHANGE], 1);
    device.auto_select_pid_profile_by_cell_count(6);

    assert_eq!(device.active_pid_profile_index(), 1);
    assert!(device.platform().acknowledgments().is_empty());
}

#[test]
fn changing_profile_moves_on() {
    let mut device = with_selectors([CHANGE, CHANGE, 4, STAY], 0);
    device.auto_select_pid_profile_by_cell_count(4);

    assert_eq!(device.active_pid_profile_index(), 2);
    assert_eq!(device.current_pid_profile(), &device.settings().pid_profiles[2]);
}

#[test]
fn exact_match_after_active_profile() {
    let mut device = with_selectors([STAY, CHANGE, 4, STAY], 1);
    device.auto_select_pid_profile_by_cell_count(4);
    assert_eq!(device.active_pid_profile_index(), 2);

    let mut device = with_selectors([STAY, CHANGE, 4, STAY], 1);
    device.auto_select_pid_profile_by_cell_count(9);
    assert_eq!(device.active_pid_profile_index(), 3);
}
