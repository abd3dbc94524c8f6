//! Speed PID for one DC motor
//!
//! Runs in the control loop. Takes the signed measured rate (RPM) of the last
//! sampling window and returns the signed throttle to apply, in [-1, 1].
//! Clockwise is positive, the target is signed by its [`Rotation`].
//!
//! The output is incremental: every update adds `raw / max_rate` to the
//! previous throttle instead of replacing it. The controller therefore
//! integrates its own past decisions, which smooths the throttle, and its
//! effective loop gain depends on how often `update` is called. Tuned gains
//! only hold for the time step they were tuned at.
//!
//! A new target seeds the throttle with the feedforward `target / max_rate`,
//! the loop only has to correct the motor's deviation from linear.
//!
//! The integral accumulator is clamped to `±max_rate / ki` after every update.
//! With `ki == 0` the bounds are zero and integral action is off.

use core::f32::consts::PI;

use crate::error::ConfigError;

/// Controller parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PidConfig {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
    /// Control loop time step in seconds
    pub dt_s: f32,
    /// Rate (RPM) that maps to full throttle, also the integral windup limit
    pub max_rate_rpm: f32,
}

impl PidConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.dt_s.is_finite() || self.dt_s <= 0.0 {
            return Err(ConfigError::InvalidTimeStep);
        }
        if !self.max_rate_rpm.is_finite() || self.max_rate_rpm <= 0.0 {
            return Err(ConfigError::InvalidMaxRate);
        }
        for gain in [self.kp, self.ki, self.kd] {
            if !gain.is_finite() || gain < 0.0 {
                return Err(ConfigError::InvalidGain);
            }
        }
        Ok(())
    }

    /// Anti-windup bounds of the integral accumulator
    pub fn integral_bounds(&self) -> (f32, f32) {
        if self.ki == 0.0 {
            return (0.0, 0.0);
        }
        let limit = self.max_rate_rpm / self.ki;
        (-limit, limit)
    }
}

/// Requested spin direction of the motor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

impl Rotation {
    /// +1 for clockwise, -1 for counter-clockwise
    pub fn sign(self) -> f32 {
        match self {
            Rotation::Clockwise => 1.0,
            Rotation::CounterClockwise => -1.0,
        }
    }
}

/// Setpoint of the controller
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Target {
    /// Speed magnitude (RPM)
    pub rate_rpm: f32,
    pub rotation: Rotation,
}

impl Target {
    /// Rate the measurement is compared against, negative counter-clockwise
    pub fn signed_rpm(&self) -> f32 {
        self.rate_rpm * self.rotation.sign()
    }
}

/// Contribution of each term in the last update
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PidTerms {
    pub p: f32,
    pub i: f32,
    pub d: f32,
    /// `p + i + d`, before normalization by the max rate
    pub total: f32,
}

/// Incremental speed PID
pub struct SpeedPid {
    config: PidConfig,
    integral_min: f32,
    integral_max: f32,
    /// `None` until the first `set_target`
    target: Option<Target>,
    last_error: f32,
    integral: f32,
    throttle: f32,
    terms: PidTerms,
}

impl SpeedPid {
    /// Build a controller, rejecting a non-positive time step or max rate and
    /// negative or non-finite gains
    pub fn new(config: PidConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let (integral_min, integral_max) = config.integral_bounds();
        Ok(Self {
            config,
            integral_min,
            integral_max,
            target: None,
            last_error: 0.0,
            integral: 0.0,
            throttle: 0.0,
            terms: PidTerms::default(),
        })
    }

    /// Track a new rate
    ///
    /// Clears the error history and the integral so no windup from the old
    /// setpoint carries over, then seeds the throttle with the feedforward
    /// value for the new target.
    pub fn set_target(&mut self, rate_rpm: f32, rotation: Rotation) {
        let target = Target { rate_rpm, rotation };
        self.target = Some(target);
        self.last_error = 0.0;
        self.integral = 0.0;
        self.throttle = (target.signed_rpm() / self.config.max_rate_rpm).clamp(-1.0, 1.0);
    }

    /// Track a new angular velocity given in rad/s
    pub fn set_target_rad_per_sec(&mut self, rad_per_sec: f32, rotation: Rotation) {
        self.set_target(rad_per_sec / (2.0 * PI) * 60.0, rotation);
    }

    /// Drop the target and zero the output
    pub fn halt(&mut self) {
        self.target = None;
        self.last_error = 0.0;
        self.integral = 0.0;
        self.throttle = 0.0;
        self.terms = PidTerms::default();
    }

    /// Run one control step with the latest measured rate
    ///
    /// Without a target the throttle is returned unchanged.
    pub fn update(&mut self, measured_rpm: f32) -> f32 {
        let Some(target) = self.target else {
            return self.throttle;
        };
        let dt = self.config.dt_s;

        let error = target.signed_rpm() - measured_rpm;

        self.integral =
            (self.integral + error * dt).clamp(self.integral_min, self.integral_max);

        let p = self.config.kp * error;
        let d = if dt == 0.0 {
            0.0
        } else {
            self.config.kd * (error - self.last_error) / dt
        };
        let i = self.config.ki * self.integral;
        let total = p + i + d;

        self.throttle = (self.throttle + total / self.config.max_rate_rpm).clamp(-1.0, 1.0);
        self.last_error = error;
        self.terms = PidTerms { p, i, d, total };

        self.throttle
    }

    pub fn config(&self) -> &PidConfig {
        &self.config
    }

    pub fn target(&self) -> Option<Target> {
        self.target
    }

    pub fn throttle(&self) -> f32 {
        self.throttle
    }

    /// Integral accumulator (error × s), before the ki gain
    pub fn integral(&self) -> f32 {
        self.integral
    }

    pub fn integral_bounds(&self) -> (f32, f32) {
        (self.integral_min, self.integral_max)
    }

    pub fn last_error(&self) -> f32 {
        self.last_error
    }

    /// Term breakdown of the last update
    pub fn terms(&self) -> PidTerms {
        self.terms
    }
}
