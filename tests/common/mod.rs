#![allow(dead_code)]

use nalgebra::Vector3;

use fc_config::platform::*;
use fc_config::settings::{FailsafeConfig, MotorConfig, PidProfile, RateProfile, ThrottleCorrectionConfig};
use fc_config::storage::image::Image;
use fc_config::{ConfigStorage, DeviceConfig, MemoryStorage, SensorModel, Target};

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Suspend,
    Resume,
    SchedulerOptimizeRate(bool),
    LoadRateProfile(usize),
    InitRcProcessing,
    ResetAdjustmentRanges,
    ReinitializeControlLaw,
    InitRcControls,
    ResetFailsafe,
    AccelerometerTrims(Vector3<i16>),
    AttitudeEstimator,
    LedStatus,
    EscEndpoints,
    DisableArming(ArmingDisableReason),
    Acknowledge(u16),
}

/// Platform recording every call made into it.
#[derive(Default)]
pub struct MockPlatform {
    pub calls: Vec<Call>,
    pub sensor: SensorModel,
    pub sampling_suspended: bool,
}

impl MockPlatform {
    pub fn acknowledgments(&self) -> Vec<u16> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Acknowledge(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl SignalSampling for MockPlatform {
    fn suspend_signal_sampling(&mut self) {
        assert!(!self.sampling_suspended, "sampling suspended twice");
        self.sampling_suspended = true;
        self.calls.push(Call::Suspend);
    }

    fn resume_signal_sampling(&mut self) {
        assert!(self.sampling_suspended, "sampling resumed while running");
        self.sampling_suspended = false;
        self.calls.push(Call::Resume);
    }
}

impl Subsystems for MockPlatform {
    fn set_scheduler_optimize_rate(&mut self, enabled: bool) {
        self.calls.push(Call::SchedulerOptimizeRate(enabled));
    }

    fn load_rate_profile(&mut self, index: usize, _profile: &RateProfile) {
        self.calls.push(Call::LoadRateProfile(index));
    }

    fn init_rc_processing(&mut self) {
        self.calls.push(Call::InitRcProcessing);
    }

    fn reset_adjustment_ranges(&mut self) {
        self.calls.push(Call::ResetAdjustmentRanges);
    }

    fn reinitialize_control_law(&mut self, _profile: &PidProfile) {
        self.calls.push(Call::ReinitializeControlLaw);
    }

    fn init_rc_controls(&mut self) {
        self.calls.push(Call::InitRcControls);
    }

    fn reset_failsafe(&mut self, _config: &FailsafeConfig) {
        self.calls.push(Call::ResetFailsafe);
    }

    fn set_accelerometer_trims(&mut self, trims: &Vector3<i16>) {
        self.calls.push(Call::AccelerometerTrims(*trims));
    }

    fn configure_attitude_estimator(&mut self, _config: &ThrottleCorrectionConfig) {
        self.calls.push(Call::AttitudeEstimator);
    }

    fn reapply_led_status(&mut self) {
        self.calls.push(Call::LedStatus);
    }

    fn init_esc_endpoints(&mut self, _motor: &MotorConfig) {
        self.calls.push(Call::EscEndpoints);
    }

    fn disable_arming(&mut self, reason: ArmingDisableReason) {
        self.calls.push(Call::DisableArming(reason));
    }
}

impl Acknowledge for MockPlatform {
    fn emit_acknowledgment(&mut self, pulses: u16) {
        self.calls.push(Call::Acknowledge(pulses));
    }
}

impl SensorDriver for MockPlatform {
    fn detected_sensor_model(&self) -> SensorModel {
        self.sensor
    }
}

/// Storage whose writes never reach the medium, reads see what was there before.
#[derive(Clone, Default)]
pub struct FailingStorage {
    pub inner: MemoryStorage,
}

#[derive(Debug, PartialEq)]
pub struct WriteProtected;

impl ConfigStorage for FailingStorage {
    type Error = WriteProtected;

    fn read_image(&mut self, image: &mut Image) -> Result<(), Self::Error> {
        image.copy_from_slice(self.inner.image());
        Ok(())
    }

    fn write_image(&mut self, _image: &Image) -> Result<(), Self::Error> {
        Err(WriteProtected)
    }
}

pub type TestDevice = DeviceConfig<MemoryStorage, MockPlatform>;

/// Device with default settings on erased storage.
pub fn device() -> TestDevice {
    DeviceConfig::new(Target::default(), MemoryStorage::new(), MockPlatform::default())
}

/// Device whose storage holds the defaults, already loaded and activated.
pub fn loaded_device() -> TestDevice {
    let mut device = device();
    device.write().unwrap();
    assert!(device.load_and_activate());
    device.platform_mut().clear();
    device
}

/// Device on write protected storage.
pub fn failing_device() -> DeviceConfig<FailingStorage, MockPlatform> {
    DeviceConfig::new(Target::default(), FailingStorage::default(), MockPlatform::default())
}
