//! Stand-in for the flight controller's runtime subsystems when editing settings images on a
//! host. Activation steps are only logged, acknowledgments are rendered as text.

use colored::Colorize;
use log::*;
use nalgebra::Vector3;

use fc_config::beeper::{self, Note};
use fc_config::platform::*;
use fc_config::settings::{FailsafeConfig, MotorConfig, PidProfile, RateProfile, ThrottleCorrectionConfig};
use fc_config::SensorModel;

pub struct HostPlatform {
    sensor: SensorModel,
}

impl HostPlatform {
    pub fn new(sensor: SensorModel) -> Self {
        Self { sensor }
    }
}

impl SignalSampling for HostPlatform {
    fn suspend_signal_sampling(&mut self) {
        trace!("Signal sampling suspended.");
    }

    fn resume_signal_sampling(&mut self) {
        trace!("Signal sampling resumed.");
    }
}

impl Subsystems for HostPlatform {
    fn set_scheduler_optimize_rate(&mut self, enabled: bool) {
        debug!("Scheduler rate optimization: {}", enabled);
    }

    fn load_rate_profile(&mut self, index: usize, profile: &RateProfile) {
        debug!("Loaded rate profile {} ({:?}).", index, profile.name);
    }

    fn init_rc_processing(&mut self) {
        debug!("RC processing initialized.");
    }

    fn reset_adjustment_ranges(&mut self) {
        debug!("Adjustment ranges reset.");
    }

    fn reinitialize_control_law(&mut self, profile: &PidProfile) {
        debug!("Control law initialized with PID profile {:?}.", profile.name);
    }

    fn init_rc_controls(&mut self) {
        debug!("RC controls initialized.");
    }

    fn reset_failsafe(&mut self, config: &FailsafeConfig) {
        debug!("Failsafe reset, procedure {:?}.", config.procedure);
    }

    fn set_accelerometer_trims(&mut self, trims: &Vector3<i16>) {
        debug!("Accelerometer trims set to {:?}.", trims.as_slice());
    }

    fn configure_attitude_estimator(&mut self, config: &ThrottleCorrectionConfig) {
        debug!("Attitude estimator configured ({:?}).", config);
    }

    fn reapply_led_status(&mut self) {
        debug!("LED status reapplied.");
    }

    fn init_esc_endpoints(&mut self, motor: &MotorConfig) {
        debug!("ESC endpoints initialized, {}-{}.", motor.min_throttle, motor.max_throttle);
    }

    fn disable_arming(&mut self, reason: ArmingDisableReason) {
        warn!("Arming disabled: {:?}", reason);
    }
}

impl Acknowledge for HostPlatform {
    fn emit_acknowledgment(&mut self, pulses: u16) {
        let melody = beeper::confirmation_beeps(pulses);
        let pattern: String = melody
            .iter()
            .map(|note: &Note| if note.pitch.is_some() { "♪" } else { " " })
            .collect();
        let freq = melody.first().and_then(|n| n.freq()).unwrap_or_default();

        println!(
            "{} [{}] ({} beeps at {:.0}Hz, {}ms)",
            "Beep".bright_yellow().bold(),
            pattern.trim_end(),
            pulses,
            freq,
            beeper::duration(&melody)
        );
    }
}

impl SensorDriver for HostPlatform {
    fn detected_sensor_model(&self) -> SensorModel {
        self.sensor
    }
}
