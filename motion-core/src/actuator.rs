//! Throttle to motor demand
//!
//! The H-bridge driver takes a direction and a duty cycle in percent. This maps
//! the controller's signed throttle onto that.

/// Bridge state requested from the motor driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorDirection {
    Forward,
    Backward,
    /// Both bridge inputs low, no drive
    Stop,
}

/// Direction plus duty cycle (0-100 %)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorDemand {
    pub direction: MotorDirection,
    pub duty_percent: u8,
}

impl MotorDemand {
    pub const STOP: Self = Self {
        direction: MotorDirection::Stop,
        duty_percent: 0,
    };

    /// Map a throttle in [-1, 1], values outside are clamped
    ///
    /// Anything that rounds to 0 % stops the motor, a NaN throttle as well.
    pub fn from_throttle(throttle: f32) -> Self {
        if throttle.is_nan() {
            return Self::STOP;
        }

        let throttle = throttle.clamp(-1.0, 1.0);
        let duty_percent = libm::roundf(libm::fabsf(throttle) * 100.0) as u8;
        if duty_percent == 0 {
            return Self::STOP;
        }

        let direction = if throttle > 0.0 {
            MotorDirection::Forward
        } else {
            MotorDirection::Backward
        };
        Self {
            direction,
            duty_percent,
        }
    }
}
