//! Hardware Resource Management
//!
//! Splits the RP2350 peripherals into one group per task, so every pin and
//! PWM slice has exactly one owner.
//!
//! # Resource Groups
//! - Encoders: both channels of both wheel encoders, owned by the edge task
//! - Motor Driver: H-bridge direction pins and the PWM slice driving both
//!   enable pins, owned by the control loop
//! - Operator: push button for encoder reset and run/halt
//!
//! Pin numbers are mirrored in [`crate::system::config`], the decoders use them
//! to route edges.

use assign_resources::assign_resources;
use embassy_rp::peripherals;

assign_resources! {
    /// Quadrature encoder channel inputs
    encoders: EncoderResources {
        left_a: PIN_0,
        left_b: PIN_1,
        right_a: PIN_12,
        right_b: PIN_13,
    },
    /// H-bridge pins, both enable inputs share PWM slice 3
    motor_driver: MotorDriverResources {
        pwm_slice: PWM_SLICE3,
        left_in1: PIN_2,
        left_in2: PIN_3,
        left_enable: PIN_6,
        right_in1: PIN_4,
        right_in2: PIN_5,
        right_enable: PIN_7,
    },
    /// Operator push button (active high)
    operator: OperatorResources {
        button_pin: PIN_16,
    },
}
