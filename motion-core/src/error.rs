//! Configuration errors
//!
//! All of these are detected while building the decoders, samplers and
//! controllers at startup. Nothing in the running loops returns an error.

use core::fmt;

/// Rejected configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Counts per revolution must be at least 1
    ZeroCountsPerRevolution,
    /// The sampling period must be longer than zero
    ZeroSamplePeriod,
    /// Wheel radius must be finite and positive (cm)
    InvalidWheelRadius,
    /// The control loop time step must be finite and positive (s)
    InvalidTimeStep,
    /// The max-rate normalization constant must be finite and positive (RPM)
    InvalidMaxRate,
    /// PID gains must be finite and not negative
    InvalidGain,
    /// Both channels of one encoder were given the same pin
    SharedChannelPin(u8),
    /// The pin is already claimed by another registered encoder
    PinAlreadyRegistered(u8),
    /// No free slot left in the encoder registry
    RegistryFull,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroCountsPerRevolution => write!(f, "counts per revolution must be non-zero"),
            Self::ZeroSamplePeriod => write!(f, "sampling period must be non-zero"),
            Self::InvalidWheelRadius => write!(f, "wheel radius must be finite and positive"),
            Self::InvalidTimeStep => write!(f, "PID time step must be finite and positive"),
            Self::InvalidMaxRate => write!(f, "max rate must be finite and positive"),
            Self::InvalidGain => write!(f, "PID gains must be finite and not negative"),
            Self::SharedChannelPin(pin) => {
                write!(f, "pin {pin} used for both channels of one encoder")
            }
            Self::PinAlreadyRegistered(pin) => {
                write!(f, "pin {pin} is already owned by another encoder")
            }
            Self::RegistryFull => write!(f, "encoder registry is full"),
        }
    }
}

impl core::error::Error for ConfigError {}
