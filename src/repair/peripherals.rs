//! Consistency between features, serial port functions and receiver settings.

use super::{disable, set};
use crate::settings::*;
use crate::target::Capabilities;

pub(super) fn fix_peripherals(settings: &mut Settings, capabilities: Capabilities) -> bool {
    let mut changed = fix_serial_features(settings);
    changed |= fix_gps_rescue(settings, capabilities);
    changed |= fix_rssi_source(settings);
    changed |= fix_rc_smoothing_dependents(settings);
    changed
}

/// Features that need a serial port are disabled if no port provides their function.
fn fix_serial_features(settings: &mut Settings) -> bool {
    let mut changed = false;
    let serial = &mut settings.serial;

    if settings.gps.provider == GpsProvider::Msp {
        changed |= serial.remove_function(SerialFunction::GPS);
    } else if !serial.has_port(SerialFunction::GPS) {
        changed |= disable(&mut settings.features, FeatureSet::GPS);
    }

    if !serial.has_port(SerialFunction::TELEMETRY) {
        changed |= disable(&mut settings.features, FeatureSet::TELEMETRY);
    }

    if !serial.has_port(SerialFunction::ESC_SENSOR) {
        changed |= disable(&mut settings.features, FeatureSet::ESC_SENSOR);
    }

    changed
}

fn fix_gps_rescue(settings: &mut Settings, capabilities: Capabilities) -> bool {
    let features = settings.features;
    let rescue_unavailable = features.contains(FeatureSet::THREE_D)
        || !features.contains(FeatureSet::GPS)
        || !capabilities.contains(Capabilities::GPS | Capabilities::GPS_RESCUE);
    if !rescue_unavailable {
        return false;
    }

    let mut changed = false;
    if settings.failsafe.procedure == FailsafeProcedure::GpsRescue {
        changed |= set(&mut settings.failsafe.procedure, FailsafeProcedure::Drop);
    }
    changed |= settings.modes.remove(BoxId::GpsRescue);
    changed
}

fn fix_rssi_source(settings: &mut Settings) -> bool {
    let mut changed = false;
    let rx = &mut settings.rx;

    if settings.features.contains(FeatureSet::RSSI_ADC) {
        changed |= set(&mut rx.rssi_channel, 0);
        changed |= set(&mut rx.rssi_src_frame_errors, false);
    } else if rx.rssi_channel != 0
        || settings.features.intersects(FeatureSet::RX_PPM | FeatureSet::RX_PARALLEL_PWM)
    {
        changed |= set(&mut rx.rssi_src_frame_errors, false);
    }

    changed
}

/// Feed-forward and throttle boost need the smoothed setpoint of the respective axes.
fn fix_rc_smoothing_dependents(settings: &mut Settings) -> bool {
    let rx = &settings.rx;
    let channels = rx.rc_interpolation_channels;
    let roll_pitch_unsmoothed = !rx.rc_smoothing || channels == InterpolationChannels::T;
    let yaw_unsmoothed = !rx.rc_smoothing || !channels.includes_yaw();
    let throttle_unsmoothed = !rx.rc_smoothing || !channels.includes_throttle();

    let mut changed = false;
    for profile in settings.pid_profiles.iter_mut() {
        if roll_pitch_unsmoothed {
            changed |= set(&mut profile.pid[Axis::Roll.index()].f, 0);
            changed |= set(&mut profile.pid[Axis::Pitch.index()].f, 0);
        }
        if yaw_unsmoothed {
            changed |= set(&mut profile.pid[Axis::Yaw.index()].f, 0);
        }
        if throttle_unsmoothed {
            changed |= set(&mut profile.throttle_boost, 0);
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gps_settings() -> Settings {
        let mut settings = Settings::default();
        settings.serial.ports[1].functions = SerialFunction::GPS;
        settings.features.insert(FeatureSet::GPS);
        settings
    }

    #[test]
    fn msp_gps_provider_frees_serial_port() {
        let mut settings = gps_settings();
        settings.gps.provider = GpsProvider::Msp;

        assert!(fix_peripherals(&mut settings, Capabilities::all()));
        assert!(!settings.serial.has_port(SerialFunction::GPS));
        assert!(settings.features.contains(FeatureSet::GPS));
    }

    #[test]
    fn gps_needs_port() {
        let mut settings = gps_settings();
        assert!(!fix_serial_features(&mut settings));
        assert!(settings.features.contains(FeatureSet::GPS));

        settings.serial.ports[1].functions = SerialFunction::empty();
        assert!(fix_serial_features(&mut settings));
        assert!(!settings.features.contains(FeatureSet::GPS));
    }

    #[test]
    fn telemetry_and_esc_sensor_need_ports() {
        let mut settings = Settings::default();
        settings.features.insert(FeatureSet::TELEMETRY | FeatureSet::ESC_SENSOR);
        settings.serial.ports[2].functions = SerialFunction::RX_SERIAL | SerialFunction::TELEMETRY_LTM;

        assert!(fix_serial_features(&mut settings));
        assert!(settings.features.contains(FeatureSet::TELEMETRY));
        assert!(!settings.features.contains(FeatureSet::ESC_SENSOR));
    }

    #[test]
    fn gps_rescue_requires_gps() {
        let mut settings = gps_settings();
        settings.failsafe.procedure = FailsafeProcedure::GpsRescue;
        let range = ChannelRange { start_step: 40, end_step: 48 };
        settings.modes.push(ModeActivationCondition::new(BoxId::GpsRescue, 2, range)).unwrap();

        assert!(!fix_gps_rescue(&mut settings, Capabilities::all()));
        assert_eq!(settings.failsafe.procedure, FailsafeProcedure::GpsRescue);

        settings.features.insert(FeatureSet::THREE_D);
        assert!(fix_gps_rescue(&mut settings, Capabilities::all()));
        assert_eq!(settings.failsafe.procedure, FailsafeProcedure::Drop);
        assert!(!settings.modes.is_present(BoxId::GpsRescue));
    }

    #[test]
    fn gps_rescue_requires_capability() {
        let mut settings = gps_settings();
        settings.failsafe.procedure = FailsafeProcedure::GpsRescue;
        let capabilities = Capabilities::all().difference(Capabilities::GPS_RESCUE);

        assert!(fix_gps_rescue(&mut settings, capabilities));
        assert_eq!(settings.failsafe.procedure, FailsafeProcedure::Drop);
    }

    #[test]
    fn rssi_sources() {
        let mut settings = Settings::default();
        settings.features.insert(FeatureSet::RSSI_ADC);
        settings.rx.rssi_channel = 8;
        settings.rx.rssi_src_frame_errors = true;
        assert!(fix_rssi_source(&mut settings));
        assert_eq!((settings.rx.rssi_channel, settings.rx.rssi_src_frame_errors), (0, false));

        let mut settings = Settings::default();
        settings.rx.rssi_channel = 8;
        settings.rx.rssi_src_frame_errors = true;
        assert!(fix_rssi_source(&mut settings));
        assert_eq!((settings.rx.rssi_channel, settings.rx.rssi_src_frame_errors), (8, false));

        let mut settings = Settings::default();
        settings.features.insert(FeatureSet::RX_SERIAL);
        settings.rx.rssi_src_frame_errors = true;
        assert!(!fix_rssi_source(&mut settings));
        assert!(settings.rx.rssi_src_frame_errors);
    }

    #[test]
    fn feed_forward_follows_smoothing() {
        let mut settings = Settings::default();
        settings.rx.rc_interpolation_channels = InterpolationChannels::Rp;
        assert!(fix_rc_smoothing_dependents(&mut settings));
        let profile = &settings.pid_profiles[0];
        assert_ne!(profile.pid[Axis::Roll.index()].f, 0);
        assert_eq!(profile.pid[Axis::Yaw.index()].f, 0);
        assert_eq!(profile.throttle_boost, 0);

        let mut settings = Settings::default();
        settings.rx.rc_smoothing = false;
        assert!(fix_rc_smoothing_dependents(&mut settings));
        assert!(settings.pid_profiles.iter().all(|p| p.pid.iter().all(|g| g.f == 0)));

        let mut settings = Settings::default();
        assert!(!fix_rc_smoothing_dependents(&mut settings));
    }
}
