//! Motor protocol constraints and the control loop timing derived from them.

use log::*;

use super::{disable, set};
use crate::settings::*;
use crate::timing::{self, SensorModel, DYNAMIC_FILTER_MAX_LOOP_TIME};

pub(super) fn fix_protocol_settings(settings: &mut Settings) -> bool {
    let mut changed = false;
    let dev = &mut settings.motor.dev;
    let protocol = dev.motor_pwm_protocol;

    if protocol == MotorProtocol::Brushed {
        changed |= disable(&mut settings.features, FeatureSet::THREE_D);
        let min_command = settings.motor.min_command.max(BRUSHED_MIN_COMMAND);
        changed |= set(&mut settings.motor.min_command, min_command);
    }

    if protocol == MotorProtocol::Standard && dev.motor_pwm_rate > BRUSHLESS_MOTORS_PWM_RATE {
        changed |= set(&mut dev.motor_pwm_rate, BRUSHLESS_MOTORS_PWM_RATE);
    }

    if protocol.is_dshot() {
        changed |= set(&mut dev.use_unsynced_pwm, false);
    }

    if protocol == MotorProtocol::Proshot1000 && dev.use_dshot_telemetry && dev.use_dshot_bitbang == DshotBitbang::On
    {
        changed |= set(&mut dev.use_dshot_bitbang, DshotBitbang::Auto);
    }

    let telemetry_unusable = !protocol.is_dshot()
        || (dev.use_dshot_bitbang == DshotBitbang::Off && dev.use_burst_dshot)
        || settings.system.scheduler_optimize_rate == SchedulerOptimizeRate::Off;
    if telemetry_unusable {
        changed |= set(&mut dev.use_dshot_telemetry, false);
    }

    changed
}

/// Makes sure the control loop does not run faster than the motor protocol can be updated.
pub(super) fn fix_loop_timing(settings: &mut Settings, sensor: SensorModel) -> bool {
    let mut changed = false;
    let hardware_lpf = settings.gyro.hardware_lpf;
    let mut gyro_denom = settings.gyro.sync_denom;
    let mut pid_denom = settings.pid.pid_process_denom;

    if hardware_lpf == GyroHardwareLpf::OneKhzSample {
        gyro_denom = 1;
        pid_denom = 1;
    }

    let sampling = timing::sampling_interval(sensor, hardware_lpf);
    let dev = &mut settings.motor.dev;
    let restriction = timing::motor_update_restriction(dev.motor_pwm_protocol);

    if dev.use_unsynced_pwm {
        if dev.motor_pwm_protocol.limits_unsynced_rate() {
            let max_rate = timing::max_update_rate(restriction);
            if dev.motor_pwm_rate > max_rate {
                debug!("Limiting unsynced motor PWM rate to {}Hz.", max_rate);
                changed |= set(&mut dev.motor_pwm_rate, max_rate);
            }
        }
    } else if timing::control_loop_period(sampling, gyro_denom, pid_denom) < restriction {
        let min_denom = timing::min_pid_process_denom(restriction, sampling, gyro_denom);
        pid_denom = pid_denom.max(min_denom);
        debug!("Raising PID process denominator to {} for {}.", pid_denom, dev.motor_pwm_protocol);
    }

    changed |= set(&mut settings.gyro.sync_denom, gyro_denom);
    changed |= set(&mut settings.pid.pid_process_denom, pid_denom);

    if sampling * gyro_denom as u32 > DYNAMIC_FILTER_MAX_LOOP_TIME {
        changed |= disable(&mut settings.features, FeatureSet::DYNAMIC_FILTER);
    }

    changed
}

#[cfg(test)]
mod tests {
    use core::time::Duration;

    use super::*;

    #[test]
    fn brushed_motors() {
        let mut settings = Settings::default();
        settings.motor.dev.motor_pwm_protocol = MotorProtocol::Brushed;
        settings.motor.min_command = 900;
        settings.features.insert(FeatureSet::THREE_D);

        assert!(fix_protocol_settings(&mut settings));
        assert!(!settings.features.contains(FeatureSet::THREE_D));
        assert_eq!(settings.motor.min_command, BRUSHED_MIN_COMMAND);
    }

    #[test]
    fn standard_pwm_rate() {
        let mut settings = Settings::default();
        settings.motor.dev.motor_pwm_protocol = MotorProtocol::Standard;
        settings.motor.dev.motor_pwm_rate = 490;

        assert!(fix_protocol_settings(&mut settings));
        assert_eq!(settings.motor.dev.motor_pwm_rate, BRUSHLESS_MOTORS_PWM_RATE);
    }

    #[test]
    fn dshot_options() {
        let mut settings = Settings::default();
        let dev = &mut settings.motor.dev;
        dev.motor_pwm_protocol = MotorProtocol::Proshot1000;
        dev.use_unsynced_pwm = true;
        dev.use_dshot_telemetry = true;
        dev.use_dshot_bitbang = DshotBitbang::On;

        assert!(fix_protocol_settings(&mut settings));
        let dev = &settings.motor.dev;
        assert!(!dev.use_unsynced_pwm);
        assert!(dev.use_dshot_telemetry);
        assert_eq!(dev.use_dshot_bitbang, DshotBitbang::Auto);
    }

    #[test]
    fn dshot_telemetry_requirements() {
        let mut settings = Settings::default();
        settings.motor.dev.use_dshot_telemetry = true;
        settings.system.scheduler_optimize_rate = SchedulerOptimizeRate::Off;
        assert!(fix_protocol_settings(&mut settings));
        assert!(!settings.motor.dev.use_dshot_telemetry);

        let mut settings = Settings::default();
        settings.motor.dev.use_dshot_telemetry = true;
        settings.motor.dev.use_dshot_bitbang = DshotBitbang::Off;
        settings.motor.dev.use_burst_dshot = true;
        assert!(fix_protocol_settings(&mut settings));
        assert!(!settings.motor.dev.use_dshot_telemetry);

        let mut settings = Settings::default();
        settings.motor.dev.use_dshot_telemetry = true;
        settings.motor.dev.motor_pwm_protocol = MotorProtocol::Multishot;
        assert!(fix_protocol_settings(&mut settings));
        assert!(!settings.motor.dev.use_dshot_telemetry);
    }

    #[test]
    fn pid_denominator_is_raised_for_slow_protocols() {
        let mut settings = Settings::default();
        settings.motor.dev.motor_pwm_protocol = MotorProtocol::Oneshot125;
        settings.gyro.sync_denom = 1;
        settings.pid.pid_process_denom = 1;

        assert!(fix_loop_timing(&mut settings, SensorModel::Mpu6000));
        assert_eq!(settings.pid.pid_process_denom, 4);
        assert!(!fix_loop_timing(&mut settings, SensorModel::Mpu6000));
    }

    #[test]
    fn fast_enough_loop_is_kept() {
        let mut settings = Settings::default();
        settings.motor.dev.motor_pwm_protocol = MotorProtocol::Oneshot42;
        settings.gyro.sync_denom = 1;
        settings.pid.pid_process_denom = 1;

        assert!(!fix_loop_timing(&mut settings, SensorModel::Mpu6000));
        assert_eq!(settings.pid.pid_process_denom, 1);
    }

    #[test]
    fn unsynced_rate_is_limited() {
        let mut settings = Settings::default();
        settings.motor.dev.motor_pwm_protocol = MotorProtocol::Oneshot125;
        settings.motor.dev.use_unsynced_pwm = true;
        settings.motor.dev.motor_pwm_rate = 4000;
        settings.pid.pid_process_denom = 1;

        assert!(fix_loop_timing(&mut settings, SensorModel::Mpu6000));
        assert_eq!(settings.motor.dev.motor_pwm_rate, 2000);
        assert_eq!(settings.pid.pid_process_denom, 1);
    }

    #[test]
    fn one_khz_sampling() {
        let mut settings = Settings::default();
        settings.gyro.hardware_lpf = GyroHardwareLpf::OneKhzSample;
        settings.gyro.sync_denom = 8;
        settings.pid.pid_process_denom = 4;
        settings.features.insert(FeatureSet::DYNAMIC_FILTER);

        assert!(fix_loop_timing(&mut settings, SensorModel::Bmi270));
        assert_eq!(settings.gyro.sync_denom, 1);
        assert_eq!(settings.pid.pid_process_denom, 1);
        assert!(!settings.features.contains(FeatureSet::DYNAMIC_FILTER));
    }

    #[test]
    fn slow_gyro_loop_disables_dynamic_filter() {
        let mut settings = Settings::default();
        settings.gyro.sync_denom = 2;
        settings.features.insert(FeatureSet::DYNAMIC_FILTER);

        // 312.5µs * 2 > 500µs
        assert!(fix_loop_timing(&mut settings, SensorModel::Bmi160));
        assert!(!settings.features.contains(FeatureSet::DYNAMIC_FILTER));

        settings.gyro.sync_denom = 1;
        settings.features.insert(FeatureSet::DYNAMIC_FILTER);
        assert!(!fix_loop_timing(&mut settings, SensorModel::Bmi160));
        assert!(timing::sampling_interval(SensorModel::Bmi160, GyroHardwareLpf::Normal) < Duration::from_micros(500));
    }
}
