//! Lifecycle of the configuration: loading and activating it at boot, writing it back, and
//! resetting it to defaults.

use log::*;

use crate::platform::{ArmingDisableReason, Platform, SamplingSuspended};
use crate::registry;
use crate::repair::{self, RepairReport};
use crate::settings::*;
use crate::storage::{ConfigStorage, StorageError};
use crate::target::{Capabilities, Target};

/// Owns the settings store together with the storage it is persisted in and the platform it is
/// activated on.
pub struct DeviceConfig<S, P> {
    pub(crate) settings: Settings,
    pub(crate) target: Target,
    pub(crate) storage: S,
    pub(crate) platform: P,
    /// index of the PID profile the runtime is using
    pub(crate) active_pid_profile: usize,
    /// index of the rate profile the runtime is using
    pub(crate) active_rate_profile: usize,
    dirty: bool,
    reboot_required: bool,
}

impl<S: ConfigStorage, P: Platform> DeviceConfig<S, P> {
    /// Creates the store from the target's compiled defaults. Nothing is read or activated yet.
    pub fn new(target: Target, storage: S, platform: P) -> Self {
        Self {
            settings: registry::defaults(&target),
            target,
            storage,
            platform,
            active_pid_profile: 0,
            active_rate_profile: 0,
            dirty: false,
            reboot_required: false,
        }
    }

    /// Loads the stored configuration, repairs and activates it. Returns `false` if the storage
    /// could not be read, in which case the settings in memory are repaired and activated instead.
    pub fn load_and_activate(&mut self) -> bool {
        let loaded = {
            let mut platform = SamplingSuspended::new(&mut self.platform);

            let loaded = match self.storage.load(&mut self.settings, &self.target) {
                Ok(()) => true,
                Err(e) => {
                    error!("Failed to load settings ({}), keeping settings in memory.", e);
                    false
                }
            };

            let sensor = platform.detected_sensor_model();
            log_repair(repair::validate_and_fix(&mut self.settings, &self.target, sensor));

            activate(&self.settings, &self.target, &mut *platform);
            loaded
        };
        // the active indices are not read by `activate`, so reloading them here is equivalent
        self.reload_pid_profile();
        self.reload_rate_profile();
        loaded
    }

    /// Repairs the settings and writes them without touching the configuration state.
    pub fn write_unmodified(&mut self) -> Result<(), StorageError<S::Error>> {
        self.validate_and_fix();

        let result = {
            let _suspended = SamplingSuspended::new(&mut self.platform);
            self.storage.write(&self.settings)
        };

        match &result {
            Ok(()) => self.dirty = false,
            Err(e) => error!("Failed to write settings: {}", e),
        }
        result
    }

    /// Marks the configuration as user configured and writes it.
    pub fn write(&mut self) -> Result<(), StorageError<S::Error>> {
        self.settings.system.configuration_state = ConfigurationState::Configured;
        self.write_unmodified()
    }

    /// Replaces the enabled features and writes the configuration.
    pub fn write_with_features(&mut self, features: FeatureSet) -> Result<(), StorageError<S::Error>> {
        self.settings.features = features;
        self.write()
    }

    /// Resets every group to its default and writes the result. With `use_custom_defaults`, the
    /// target's custom defaults are used instead. Returns `false` without writing anything if
    /// those are not available.
    pub fn reset_to_defaults(&mut self, use_custom_defaults: bool) -> bool {
        if use_custom_defaults {
            if let Err(e) = registry::reset_to_custom_defaults(&mut self.settings, &self.target) {
                warn!("Custom defaults not applied: {}", e);
                return false;
            }
        } else {
            registry::reset_all(&mut self.settings, &self.target);
        }

        info!("Settings reset to defaults.");
        // failures are logged, the defaults stay active in memory
        let _ = self.write_unmodified();
        true
    }

    /// Resets the stored configuration if it is missing, corrupt or of another format version.
    pub fn ensure_structure_valid(&mut self) {
        let valid = {
            let _suspended = SamplingSuspended::new(&mut self.platform);
            self.storage.is_structure_valid()
        };

        if !valid {
            warn!("Stored settings are invalid, resetting to defaults.");
            self.reset_to_defaults(false);
        }
    }

    /// Writes the configuration, reloads it and confirms with a single beep.
    pub fn save_and_notify(&mut self) {
        // write failures are logged, the reload then falls back to what is in memory
        let _ = self.write();
        self.load_and_activate();
        self.platform.emit_acknowledgment(1);
    }

    /// Runs the repair engine on the in-memory settings and reloads the active profiles.
    pub fn validate_and_fix(&mut self) -> RepairReport {
        let sensor = self.platform.detected_sensor_model();
        let report = repair::validate_and_fix(&mut self.settings, &self.target, sensor);
        log_repair(report);
        self.reload_pid_profile();
        self.reload_rate_profile();
        report
    }

    /// Points the active PID profile at the stored index. An out of range index keeps the
    /// previous profile.
    pub(crate) fn reload_pid_profile(&mut self) {
        let index = self.settings.system.pid_profile_index as usize;
        if index < PID_PROFILE_COUNT {
            self.active_pid_profile = index;
        }
    }

    pub(crate) fn reload_rate_profile(&mut self) {
        let index = self.settings.system.active_rate_profile as usize;
        if index < CONTROL_RATE_PROFILE_COUNT {
            self.active_rate_profile = index;
        }
    }

    pub fn set_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Flags that a changed setting only takes effect after a reboot, and blocks arming until then.
    pub fn mark_reboot_required(&mut self) {
        self.reboot_required = true;
        self.platform.disable_arming(ArmingDisableReason::RebootRequired);
    }

    pub fn is_reboot_required(&self) -> bool {
        self.reboot_required
    }

    pub fn is_configured(&self) -> bool {
        self.settings.is_configured()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Mutable access to the store. Callers are responsible for [`Self::set_dirty`].
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn active_pid_profile_index(&self) -> u8 {
        self.active_pid_profile as u8
    }

    pub fn active_rate_profile_index(&self) -> u8 {
        self.active_rate_profile as u8
    }

    pub fn current_pid_profile(&self) -> &PidProfile {
        &self.settings.pid_profiles[self.active_pid_profile]
    }

    pub fn current_rate_profile(&self) -> &RateProfile {
        &self.settings.rate_profiles[self.active_rate_profile]
    }

    pub fn current_min_throttle(&self) -> u16 {
        self.settings.motor.min_throttle
    }

    /// Resets a single PID profile to its defaults. Returns `false` for an invalid index.
    pub fn reset_pid_profile(&mut self, index: usize) -> bool {
        match self.settings.pid_profiles.get_mut(index) {
            Some(profile) => {
                registry::reset_pid_profile(profile);
                true
            }
            None => false,
        }
    }

    /// Copies PID profile `src` over `dst`. Returns `false` for invalid or identical indices.
    pub fn copy_pid_profile(&mut self, src: usize, dst: usize) -> bool {
        if src == dst || src >= PID_PROFILE_COUNT || dst >= PID_PROFILE_COUNT {
            return false;
        }

        self.settings.pid_profiles[dst] = self.settings.pid_profiles[src].clone();
        true
    }
}

fn log_repair(report: RepairReport) {
    if !report.is_empty() {
        info!("Repaired inconsistent settings: {:?}", report);
    }
}

/// Pushes the configuration into the runtime subsystems.
fn activate<P: Platform>(settings: &Settings, target: &Target, platform: &mut P) {
    let dshot_telemetry = settings.motor.dev.use_dshot_telemetry;
    let optimize_rate = match settings.system.scheduler_optimize_rate {
        SchedulerOptimizeRate::On => true,
        SchedulerOptimizeRate::Auto => dshot_telemetry,
        SchedulerOptimizeRate::Off => false,
    };
    platform.set_scheduler_optimize_rate(optimize_rate);

    let rate_index = settings.system.active_rate_profile as usize;
    platform.load_rate_profile(rate_index, settings.rate_profile());

    platform.init_rc_processing();
    platform.reset_adjustment_ranges();
    platform.reinitialize_control_law(settings.pid_profile());
    platform.init_rc_controls();
    platform.reset_failsafe(&settings.failsafe);

    if target.capabilities.contains(Capabilities::ACC) {
        platform.set_accelerometer_trims(&settings.accelerometer.acc_zero);
    }

    platform.configure_attitude_estimator(&settings.throttle_correction);

    if target.capabilities.contains(Capabilities::LED_STRIP_STATUS_MODE) {
        platform.reapply_led_status();
    }

    debug!(
        "Activated settings, PID profile {}, rate profile {}.",
        settings.system.pid_profile_index, settings.system.active_rate_profile
    );
}
