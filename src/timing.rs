//! Timing constants of gyro sensors and motor protocols, and the loop timing derived from them.

use core::time::Duration;

use enum_map::{enum_map, Enum, EnumMap};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::settings::{GyroHardwareLpf, MotorProtocol, BRUSHLESS_MOTORS_PWM_RATE, MAX_PID_PROCESS_DENOM};

/// Gyro loops slower than this cannot run the dynamic filter.
pub const DYNAMIC_FILTER_MAX_LOOP_TIME: Duration = Duration::from_micros(500);

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Gyro sensor models, as reported by the sensor driver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Enum, EnumIter, EnumString, Display, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
pub enum SensorModel {
    #[default]
    None,
    Mpu6000,
    Mpu6500,
    Mpu9250,
    Icm20601,
    Icm20602,
    Icm20608g,
    Icm20649,
    Icm20689,
    Icm42605,
    Icm42688p,
    Bmi160,
    Bmi270,
    Lsm6dso,
}

fn sampling_intervals() -> EnumMap<SensorModel, Duration> {
    enum_map! {
        SensorModel::Icm20649 => Duration::from_nanos(NANOS_PER_SECOND / 9000),
        SensorModel::Bmi160 => Duration::from_nanos(312_500),
        _ => Duration::from_micros(125),
    }
}

/// Sampling intervals with the sensor's 1kHz hardware lowpass enabled.
fn one_khz_sampling_intervals() -> EnumMap<SensorModel, Duration> {
    enum_map! {
        SensorModel::Icm20649 => Duration::from_nanos(NANOS_PER_SECOND / 1100),
        _ => Duration::from_millis(1),
    }
}

/// Shortest interval at which each protocol can accept a new motor command.
fn motor_update_restrictions() -> EnumMap<MotorProtocol, Duration> {
    enum_map! {
        MotorProtocol::Standard => Duration::from_nanos(NANOS_PER_SECOND / BRUSHLESS_MOTORS_PWM_RATE as u64),
        MotorProtocol::Oneshot125 => Duration::from_micros(500),
        MotorProtocol::Oneshot42 => Duration::from_micros(100),
        MotorProtocol::Dshot150 => Duration::from_micros(250),
        MotorProtocol::Dshot300 => Duration::from_micros(100),
        _ => Duration::from_nanos(31_250),
    }
}

pub fn sampling_interval(sensor: SensorModel, hardware_lpf: GyroHardwareLpf) -> Duration {
    match hardware_lpf {
        GyroHardwareLpf::Normal => sampling_intervals()[sensor],
        GyroHardwareLpf::OneKhzSample => one_khz_sampling_intervals()[sensor],
    }
}

pub fn motor_update_restriction(protocol: MotorProtocol) -> Duration {
    motor_update_restrictions()[protocol]
}

/// Highest PWM rate (Hz) for a given minimum update interval, rounded to the nearest integer.
pub fn max_update_rate(restriction: Duration) -> u16 {
    let nanos = restriction.as_nanos().max(1) as u64;
    let rate = (NANOS_PER_SECOND + nanos / 2) / nanos;
    rate.min(u16::MAX as u64) as u16
}

/// Duration of one control loop iteration.
pub fn control_loop_period(sampling: Duration, gyro_sync_denom: u8, pid_process_denom: u8) -> Duration {
    sampling * (gyro_sync_denom as u32 * pid_process_denom as u32)
}

/// Smallest PID denominator for which the control loop is not faster than `restriction`,
/// bounded by [`MAX_PID_PROCESS_DENOM`].
pub fn min_pid_process_denom(restriction: Duration, sampling: Duration, gyro_sync_denom: u8) -> u8 {
    let gyro_period = (sampling.as_nanos() * gyro_sync_denom.max(1) as u128).max(1);
    let denom = restriction.as_nanos().div_ceil(gyro_period);
    denom.clamp(1, MAX_PID_PROCESS_DENOM as u128) as u8
}
