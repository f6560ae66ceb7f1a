use super::set;
use crate::settings::*;
use crate::target::Capabilities;

pub(super) fn fix_ranges(settings: &mut Settings, capabilities: Capabilities) -> bool {
    let mut changed = false;

    for profile in settings.pid_profiles.iter_mut() {
        if profile.motor_output_limit == 0 || profile.motor_output_limit > 100 {
            changed |= set(&mut profile.motor_output_limit, 100);
        }

        if profile.cell_count_selector().is_none() {
            changed |= set(&mut profile.auto_profile_cell_count, AUTO_PROFILE_CELL_COUNT_STAY);
        }
    }

    let sync_denom = settings.gyro.sync_denom.clamp(1, MAX_GYRO_SYNC_DENOM);
    changed |= set(&mut settings.gyro.sync_denom, sync_denom);
    let pid_denom = settings.pid.pid_process_denom.clamp(1, MAX_PID_PROCESS_DENOM);
    changed |= set(&mut settings.pid.pid_process_denom, pid_denom);

    changed |= fix_beeper(&mut settings.beeper);

    if capabilities.contains(Capabilities::VTX_TABLE) {
        changed |= fix_vtx(&mut settings.vtx, &settings.vtx_table);
    }

    changed
}

fn fix_beeper(beeper: &mut BeeperConfig) -> bool {
    let mut changed = false;
    if BeeperModes::from_bits(beeper.beeper_off_flags).is_none() {
        changed |= set(&mut beeper.beeper_off_flags, 0);
    }

    let beacon_allowed = BeeperModes::DSHOT_BEACON_ALLOWED.bits();
    if beeper.dshot_beacon_off_flags & !beacon_allowed != 0 {
        changed |= set(&mut beeper.dshot_beacon_off_flags, 0);
    }

    if !(DSHOT_BEACON_TONE_MIN..=DSHOT_BEACON_TONE_MAX).contains(&beeper.dshot_beacon_tone) {
        changed |= set(&mut beeper.dshot_beacon_tone, DSHOT_BEACON_TONE_MIN);
    }
    changed
}

fn fix_vtx(vtx: &mut VtxSettings, table: &VtxTable) -> bool {
    let mut changed = false;
    if vtx.channel > table.channels {
        changed |= set(&mut vtx.channel, 0);
        if vtx.band > 0 {
            changed |= set(&mut vtx.freq, 0);
        }
    }

    if vtx.band > table.bands {
        changed |= set(&mut vtx.band, 0);
        changed |= set(&mut vtx.freq, 0);
    }

    if vtx.power > table.power_levels {
        changed |= set(&mut vtx.power, 0);
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motor_output_limit() {
        let mut settings = Settings::default();
        settings.pid_profiles[0].motor_output_limit = 0;
        settings.pid_profiles[1].motor_output_limit = 101;
        settings.pid_profiles[2].motor_output_limit = 1;

        assert!(fix_ranges(&mut settings, Capabilities::all()));
        assert_eq!(settings.pid_profiles[0].motor_output_limit, 100);
        assert_eq!(settings.pid_profiles[1].motor_output_limit, 100);
        assert_eq!(settings.pid_profiles[2].motor_output_limit, 1);
    }

    #[test]
    fn cell_count_selector_out_of_range_stays() {
        let mut settings = Settings::default();
        settings.pid_profiles[0].auto_profile_cell_count = 9;
        settings.pid_profiles[1].auto_profile_cell_count = -5;
        settings.pid_profiles[2].auto_profile_cell_count = AUTO_PROFILE_CELL_COUNT_CHANGE;
        settings.pid_profiles[3].auto_profile_cell_count = 6;

        fix_ranges(&mut settings, Capabilities::all());
        let selectors: [i8; 4] = core::array::from_fn(|i| settings.pid_profiles[i].auto_profile_cell_count);
        assert_eq!(selectors, [0, 0, -1, 6]);
    }

    #[test]
    fn loop_denominators() {
        let mut settings = Settings::default();
        settings.gyro.sync_denom = 0;
        settings.pid.pid_process_denom = 40;

        assert!(fix_ranges(&mut settings, Capabilities::all()));
        assert_eq!(settings.gyro.sync_denom, 1);
        assert_eq!(settings.pid.pid_process_denom, MAX_PID_PROCESS_DENOM);
    }

    #[test]
    fn beeper_masks() {
        let mut settings = Settings::default();
        settings.beeper.beeper_off_flags = (BeeperModes::ARMING | BeeperModes::USB).bits();
        settings.beeper.dshot_beacon_off_flags = BeeperModes::ARMING.bits();
        settings.beeper.dshot_beacon_tone = 6;

        assert!(fix_ranges(&mut settings, Capabilities::all()));
        assert_eq!(settings.beeper.beeper_off_flags, (BeeperModes::ARMING | BeeperModes::USB).bits());
        assert_eq!(settings.beeper.dshot_beacon_off_flags, 0);
        assert_eq!(settings.beeper.dshot_beacon_tone, 1);

        settings.beeper.beeper_off_flags = 1 << 31;
        assert!(fix_ranges(&mut settings, Capabilities::all()));
        assert_eq!(settings.beeper.beeper_off_flags, 0);
    }

    #[test]
    fn vtx_table_bounds() {
        let mut settings = Settings::default();
        settings.vtx = VtxSettings { band: 2, channel: 9, power: 6, freq: 5800, ..Default::default() };

        assert!(fix_ranges(&mut settings, Capabilities::all()));
        assert_eq!((settings.vtx.band, settings.vtx.channel, settings.vtx.power, settings.vtx.freq), (2, 0, 0, 0));

        settings.vtx = VtxSettings { band: 6, channel: 1, power: 1, freq: 5800, ..Default::default() };
        fix_ranges(&mut settings, Capabilities::all());
        assert_eq!((settings.vtx.band, settings.vtx.freq), (0, 0));
    }

    #[test]
    fn vtx_untouched_without_table() {
        let mut settings = Settings::default();
        settings.vtx.channel = 200;
        assert!(!fix_ranges(&mut settings, Capabilities::empty()));
        assert_eq!(settings.vtx.channel, 200);
    }
}
