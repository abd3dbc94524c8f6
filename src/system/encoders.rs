//! Encoder State
//!
//! The decoders and metric blocks shared between the edge, sampling and control
//! contexts. They are plain statics built on atomics: the edge task is the only
//! writer of a decoder, the sampling task the only writer of a metrics block.

use defmt::Format;
use motion_core::{MetricsSnapshot, MotionMetrics, QuadratureDecoder};

use crate::system::config;

/// Left wheel decoder, written by the edge task
pub static LEFT_ENCODER: QuadratureDecoder = QuadratureDecoder::new(config::LEFT_ENCODER_PINS);
/// Right wheel decoder, written by the edge task
pub static RIGHT_ENCODER: QuadratureDecoder = QuadratureDecoder::new(config::RIGHT_ENCODER_PINS);

/// Left wheel metrics, written by the sampling task
pub static LEFT_METRICS: MotionMetrics = MotionMetrics::new();
/// Right wheel metrics, written by the sampling task
pub static RIGHT_METRICS: MotionMetrics = MotionMetrics::new();

/// Wheel selection
#[derive(Debug, Clone, Copy, PartialEq, Format)]
pub enum Wheel {
    Left,
    Right,
}

impl Wheel {
    /// All wheels, in the order the tasks process them
    pub const ALL: [Wheel; 2] = [Wheel::Left, Wheel::Right];

    pub fn decoder(self) -> &'static QuadratureDecoder {
        match self {
            Wheel::Left => &LEFT_ENCODER,
            Wheel::Right => &RIGHT_ENCODER,
        }
    }

    pub fn metrics(self) -> &'static MotionMetrics {
        match self {
            Wheel::Left => &LEFT_METRICS,
            Wheel::Right => &RIGHT_METRICS,
        }
    }

    /// Ticks, direction and metrics of this wheel right now
    pub fn snapshot(self) -> MetricsSnapshot {
        MetricsSnapshot::capture(self.decoder(), self.metrics())
    }
}
