//! Drive Configuration
//!
//! Compile-time constants for wiring, encoder geometry, timing and controller
//! tuning. They are turned into validated core configurations once at startup;
//! an invalid value stops the firmware before any task runs.
//!
//! # Wiring (RP2350 GPIO)
//! - Left encoder: A = GPIO 0, B = GPIO 1
//! - Right encoder: A = GPIO 12, B = GPIO 13
//! - Left motor: IN1 = GPIO 2, IN2 = GPIO 3, EN = GPIO 6 (PWM3 A)
//! - Right motor: IN1 = GPIO 4, IN2 = GPIO 5, EN = GPIO 7 (PWM3 B)
//! - Operator button: GPIO 16
//!
//! The pin numbers below must match the peripherals assigned in
//! [`crate::system::resources`].

use embassy_time::Duration;
use motion_core::{EncoderConfig, EncoderPins, PidConfig, Rotation};

/// Left encoder channel pins
pub const LEFT_ENCODER_PINS: EncoderPins = EncoderPins::new(0, 1);
/// Right encoder channel pins
pub const RIGHT_ENCODER_PINS: EncoderPins = EncoderPins::new(12, 13);

/// Encoder ticks per output shaft revolution (11 PPR × 30:1 gearbox)
pub const COUNTS_PER_REVOLUTION: u32 = 330;
/// Wheel radius in cm
pub const WHEEL_RADIUS_CM: f32 = 3.0;

/// Tick-to-metrics sampling period
pub const SAMPLE_PERIOD: Duration = Duration::from_millis(100);
/// Control loop period, also the PID time step
pub const CONTROL_PERIOD: Duration = Duration::from_millis(100);
/// Period of the metrics log lines
pub const REPORT_PERIOD: Duration = Duration::from_millis(500);

/// Proportional gain
pub const KP: f32 = 0.4;
/// Integral gain
pub const KI: f32 = 0.02;
/// Derivative gain
pub const KD: f32 = 0.01;
/// Motor speed at full throttle (RPM)
pub const MAX_RATE_RPM: f32 = 210.0;

/// Speed tracked after power-up (RPM)
pub const TARGET_RPM: f32 = 120.0;
/// Spin direction tracked after power-up
pub const TARGET_ROTATION: Rotation = Rotation::Clockwise;

/// H-bridge PWM frequency, cheap DC motors behave well around 10 kHz
pub const PWM_FREQUENCY_HZ: u32 = 10_000;

/// Encoder geometry and sampling period for the samplers
pub fn encoder_config() -> EncoderConfig {
    EncoderConfig {
        counts_per_revolution: COUNTS_PER_REVOLUTION,
        wheel_radius_cm: WHEEL_RADIUS_CM,
        sample_period_us: SAMPLE_PERIOD.as_micros() as u32,
    }
}

/// Gains and time step for the speed controllers
pub fn pid_config() -> PidConfig {
    PidConfig {
        kp: KP,
        ki: KI,
        kd: KD,
        dt_s: CONTROL_PERIOD.as_micros() as f32 / 1_000_000.0,
        max_rate_rpm: MAX_RATE_RPM,
    }
}
