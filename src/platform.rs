//! Interfaces to the rest of the firmware: signal sampling, runtime subsystems, the
//! acknowledgment beeper and the gyro driver.

use core::ops::{Deref, DerefMut};

use nalgebra::Vector3;

use crate::settings::{FailsafeConfig, MotorConfig, PidProfile, RateProfile, ThrottleCorrectionConfig};
use crate::timing::SensorModel;

/// Periodic hardware signal acquisition that has to be paused while the storage is busy.
pub trait SignalSampling {
    fn suspend_signal_sampling(&mut self);
    fn resume_signal_sampling(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArmingDisableReason {
    RebootRequired,
}

/// Runtime subsystems that the active configuration is pushed into.
pub trait Subsystems {
    fn set_scheduler_optimize_rate(&mut self, enabled: bool);
    fn load_rate_profile(&mut self, index: usize, profile: &RateProfile);
    fn init_rc_processing(&mut self);
    fn reset_adjustment_ranges(&mut self);
    fn reinitialize_control_law(&mut self, profile: &PidProfile);
    fn init_rc_controls(&mut self);
    fn reset_failsafe(&mut self, config: &FailsafeConfig);
    fn set_accelerometer_trims(&mut self, trims: &Vector3<i16>);
    fn configure_attitude_estimator(&mut self, config: &ThrottleCorrectionConfig);
    fn reapply_led_status(&mut self);
    fn init_esc_endpoints(&mut self, motor: &MotorConfig);
    fn disable_arming(&mut self, reason: ArmingDisableReason);
}

/// Audible (or visible) confirmation of user actions.
pub trait Acknowledge {
    fn emit_acknowledgment(&mut self, pulses: u16);
}

pub trait SensorDriver {
    fn detected_sensor_model(&self) -> SensorModel;
}

/// Everything the configuration store needs from the firmware.
pub trait Platform: SignalSampling + Subsystems + Acknowledge + SensorDriver {}

impl<T: SignalSampling + Subsystems + Acknowledge + SensorDriver> Platform for T {}

/// Keeps signal sampling suspended while alive, resuming it when dropped.
pub struct SamplingSuspended<'a, P: SignalSampling> {
    platform: &'a mut P,
}

impl<'a, P: SignalSampling> SamplingSuspended<'a, P> {
    pub fn new(platform: &'a mut P) -> Self {
        platform.suspend_signal_sampling();
        Self { platform }
    }
}

impl<P: SignalSampling> Deref for SamplingSuspended<'_, P> {
    type Target = P;

    fn deref(&self) -> &P {
        self.platform
    }
}

impl<P: SignalSampling> DerefMut for SamplingSuspended<'_, P> {
    fn deref_mut(&mut self) -> &mut P {
        self.platform
    }
}

impl<P: SignalSampling> Drop for SamplingSuspended<'_, P> {
    fn drop(&mut self) {
        self.platform.resume_signal_sampling();
    }
}
