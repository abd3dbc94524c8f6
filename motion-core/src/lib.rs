//! Motion core for the encoder drive firmware
//!
//! Hardware-independent part of the drive: everything that has to agree on
//! shared state across execution contexts lives here, so it can be tested on
//! the host.
//!
//! # Data flow
//! ```text
//! edge context        periodic context        control loop
//! QuadratureDecoder -> Sampler -> MotionMetrics -> SpeedPid -> MotorDemand
//!     (AtomicI32)                  (AtomicF32)
//! ```
//!
//! - [`decoder`]: turns channel level changes into signed ticks and direction
//! - [`registry`]: routes an edge on a pin to the decoder owning that pin
//! - [`sampler`]: converts tick deltas into RPM, cm/s, cm and rotations
//! - [`pid`]: incremental speed PID producing a throttle in [-1, 1]
//! - [`actuator`]: maps a throttle onto motor direction and duty
//!
//! Nothing in here blocks. The edge path uses atomics only and never takes a
//! lock.

#![cfg_attr(not(test), no_std)]

pub mod actuator;
pub mod atomic;
pub mod decoder;
pub mod error;
pub mod pid;
pub mod registry;
pub mod sampler;

pub use actuator::{MotorDemand, MotorDirection};
pub use decoder::{ChannelLevels, Direction, EncoderPins, QuadratureDecoder, Step, TickSource};
pub use error::ConfigError;
pub use pid::{PidConfig, PidTerms, Rotation, SpeedPid, Target};
pub use registry::EncoderRegistry;
pub use sampler::{EncoderConfig, MetricsSnapshot, MotionMetrics, Sampler};
