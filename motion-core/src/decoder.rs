//! Quadrature edge decoder
//!
//! Runs in the edge context: every level change on channel A or B of an
//! encoder ends up in [`QuadratureDecoder::on_edge`], which turns the change
//! into one signed tick.
//!
//! # Decoding
//! The forward sequence of the (A, B) levels is
//! ```text
//! 00 -> 01 -> 11 -> 10 -> 00
//! ```
//! Every transition of that sequence counts +1, every transition of the
//! reversed sequence counts -1. For a single channel change the step is
//! forward exactly when the previous A level differs from the new B level.
//!
//! A change of both channels at once cannot come from a single physical step,
//! it means an edge was missed. It is not rejected, it is counted as one
//! backward step and shows up as count error. An edge that leaves both levels
//! unchanged (duplicate interrupt, glitch) is ignored.
//!
//! # Shared state
//! - tick counter: `AtomicI32`, written here only, read by the sampler
//! - direction: `AtomicU8`, written here only
//! - edge state: owned by the edge context, kept in an atomic only so the
//!   decoder can live in a `static`

use core::sync::atomic::{AtomicI32, AtomicU8, Ordering};

/// Rotation direction of the last decoded step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Direction {
    /// No step decoded since start or reset
    Unknown = 0,
    Forward = 1,
    Backward = 2,
}

impl Direction {
    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Direction::Forward,
            2 => Direction::Backward,
            _ => Direction::Unknown,
        }
    }
}

/// One decoded quadrature step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    Forward,
    Backward,
}

impl Step {
    /// Classify the change from `previous` to `current`, `None` if nothing changed
    pub fn between(previous: ChannelLevels, current: ChannelLevels) -> Option<Self> {
        if previous == current {
            return None;
        }

        let both_flipped = previous.a != current.a && previous.b != current.b;
        if both_flipped {
            // missed edge, tolerated as count error
            return Some(Step::Backward);
        }

        if previous.a != current.b {
            Some(Step::Forward)
        } else {
            Some(Step::Backward)
        }
    }

    /// Counter increment for this step
    pub fn delta(self) -> i32 {
        match self {
            Step::Forward => 1,
            Step::Backward => -1,
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Step::Forward => Direction::Forward,
            Step::Backward => Direction::Backward,
        }
    }
}

/// Logical levels of both encoder channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelLevels {
    pub a: bool,
    pub b: bool,
}

impl ChannelLevels {
    pub const fn new(a: bool, b: bool) -> Self {
        Self { a, b }
    }

    const fn to_bits(self) -> u8 {
        (self.a as u8) | ((self.b as u8) << 1)
    }

    const fn from_bits(bits: u8) -> Self {
        Self {
            a: bits & 0b01 != 0,
            b: bits & 0b10 != 0,
        }
    }
}

/// GPIO numbers of the two encoder channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderPins {
    pub a: u8,
    pub b: u8,
}

impl EncoderPins {
    pub const fn new(a: u8, b: u8) -> Self {
        Self { a, b }
    }

    /// Whether `pin` is one of this encoder's channels
    pub fn owns(&self, pin: u8) -> bool {
        self.a == pin || self.b == pin
    }
}

/// Anything that can hand out the current tick count
///
/// The sampler only depends on this, not on the decoder itself.
pub trait TickSource {
    fn ticks(&self) -> i32;
}

/// Decoder state of one encoder
///
/// `const` constructible so every encoder can be a `static` shared between the
/// edge context (writer) and everyone else (readers).
#[derive(Debug)]
pub struct QuadratureDecoder {
    pins: EncoderPins,
    ticks: AtomicI32,
    direction: AtomicU8,
    levels: AtomicU8,
}

impl QuadratureDecoder {
    pub const fn new(pins: EncoderPins) -> Self {
        Self {
            pins,
            ticks: AtomicI32::new(0),
            direction: AtomicU8::new(Direction::Unknown as u8),
            levels: AtomicU8::new(0),
        }
    }

    pub fn pins(&self) -> EncoderPins {
        self.pins
    }

    /// Capture the channel levels present when decoding starts
    ///
    /// Call once before edges are enabled, otherwise the first edge is
    /// compared against both channels low.
    pub fn attach(&self, levels: ChannelLevels) {
        self.levels.store(levels.to_bits(), Ordering::Relaxed);
    }

    /// Handle a level change on either channel
    ///
    /// Edge context only. Returns the decoded step, `None` when the levels did
    /// not change.
    pub fn on_edge(&self, current: ChannelLevels) -> Option<Step> {
        let previous = ChannelLevels::from_bits(self.levels.load(Ordering::Relaxed));
        let step = Step::between(previous, current)?;

        self.ticks.fetch_add(step.delta(), Ordering::Release);
        self.direction
            .store(step.direction() as u8, Ordering::Relaxed);
        self.levels.store(current.to_bits(), Ordering::Relaxed);

        Some(step)
    }

    /// Current signed tick count
    pub fn ticks(&self) -> i32 {
        self.ticks.load(Ordering::Acquire)
    }

    /// Direction of the last decoded step
    pub fn direction(&self) -> Direction {
        Direction::from_raw(self.direction.load(Ordering::Relaxed))
    }

    /// Zero the counter and forget the direction
    ///
    /// Runs inside a critical section, so on a single core it cannot
    /// interleave with `on_edge`. If edges are decoded on the other core, the
    /// caller has to pause decoding first.
    pub fn reset(&self) {
        critical_section::with(|_| {
            self.ticks.store(0, Ordering::Release);
            self.direction
                .store(Direction::Unknown as u8, Ordering::Relaxed);
        });
    }
}

impl TickSource for QuadratureDecoder {
    fn ticks(&self) -> i32 {
        QuadratureDecoder::ticks(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORWARD_CYCLE: [ChannelLevels; 4] = [
        ChannelLevels::new(false, true),
        ChannelLevels::new(true, true),
        ChannelLevels::new(true, false),
        ChannelLevels::new(false, false),
    ];

    const REVERSE_CYCLE: [ChannelLevels; 4] = [
        ChannelLevels::new(true, false),
        ChannelLevels::new(true, true),
        ChannelLevels::new(false, true),
        ChannelLevels::new(false, false),
    ];

    fn decoder() -> QuadratureDecoder {
        let decoder = QuadratureDecoder::new(EncoderPins::new(0, 1));
        decoder.attach(ChannelLevels::new(false, false));
        decoder
    }

    #[test]
    fn forward_cycle_counts_four() {
        let decoder = decoder();
        for levels in FORWARD_CYCLE {
            assert_eq!(decoder.on_edge(levels), Some(Step::Forward));
        }
        assert_eq!(decoder.ticks(), 4);
        assert_eq!(decoder.direction(), Direction::Forward);
    }

    #[test]
    fn reversed_cycle_counts_minus_four() {
        let decoder = decoder();
        for levels in REVERSE_CYCLE {
            assert_eq!(decoder.on_edge(levels), Some(Step::Backward));
        }
        assert_eq!(decoder.ticks(), -4);
        assert_eq!(decoder.direction(), Direction::Backward);
    }

    #[test]
    fn one_direction_is_monotonic() {
        let decoder = decoder();
        let mut last = decoder.ticks();
        for levels in FORWARD_CYCLE.iter().cycle().take(40) {
            decoder.on_edge(*levels);
            assert!(decoder.ticks() > last);
            last = decoder.ticks();
        }
        assert_eq!(last, 40);

        for levels in REVERSE_CYCLE.iter().cycle().take(60) {
            decoder.on_edge(*levels);
            assert!(decoder.ticks() < last);
            last = decoder.ticks();
        }
        assert_eq!(last, -20);
    }

    #[test]
    fn unchanged_levels_are_ignored() {
        let decoder = decoder();
        decoder.on_edge(ChannelLevels::new(false, true));
        assert_eq!(decoder.on_edge(ChannelLevels::new(false, true)), None);
        assert_eq!(decoder.ticks(), 1);
        assert_eq!(decoder.direction(), Direction::Forward);
    }

    #[test]
    fn missed_edge_counts_backward() {
        let decoder = decoder();
        assert_eq!(
            decoder.on_edge(ChannelLevels::new(true, true)),
            Some(Step::Backward)
        );
        assert_eq!(decoder.ticks(), -1);
    }

    #[test]
    fn attach_seeds_edge_state() {
        let decoder = QuadratureDecoder::new(EncoderPins::new(0, 1));
        decoder.attach(ChannelLevels::new(true, true));
        assert_eq!(
            decoder.on_edge(ChannelLevels::new(true, false)),
            Some(Step::Forward)
        );
        assert_eq!(decoder.ticks(), 1);
    }

    #[test]
    fn stuck_channel_never_settles_on_a_direction() {
        // channel B stuck low: A toggles alone and steps alternate
        let decoder = decoder();
        let mut directions = [Direction::Unknown; 4];
        for (i, a) in [true, false, true, false].into_iter().enumerate() {
            decoder.on_edge(ChannelLevels::new(a, false));
            directions[i] = decoder.direction();
        }
        assert_eq!(decoder.ticks(), 0);
        assert_ne!(directions[0], directions[1]);
    }

    #[test]
    fn reset_clears_ticks_and_direction() {
        let decoder = decoder();
        for levels in FORWARD_CYCLE.iter().cycle().take(7) {
            decoder.on_edge(*levels);
        }
        decoder.reset();
        assert_eq!(decoder.ticks(), 0);
        assert_eq!(decoder.direction(), Direction::Unknown);

        // decoding continues from the current levels
        decoder.on_edge(ChannelLevels::new(false, false));
        assert_eq!(decoder.ticks(), 1);
    }

    #[test]
    fn reset_on_fresh_decoder() {
        let decoder = decoder();
        decoder.reset();
        assert_eq!(decoder.ticks(), 0);
        assert_eq!(decoder.direction(), Direction::Unknown);
    }

    #[test]
    fn reader_never_sees_torn_or_backward_counts() {
        let decoder = decoder();
        let cycles = 10_000;

        std::thread::scope(|s| {
            s.spawn(|| {
                for levels in FORWARD_CYCLE.iter().cycle().take(cycles * 4) {
                    decoder.on_edge(*levels);
                }
            });
            s.spawn(|| {
                let mut last = 0;
                while last < (cycles * 4) as i32 {
                    let now = decoder.ticks();
                    assert!(now >= last);
                    assert!(now <= (cycles * 4) as i32);
                    last = now;
                }
            });
        });

        assert_eq!(decoder.ticks(), (cycles * 4) as i32);
    }

    #[test]
    fn pins_ownership() {
        let pins = EncoderPins::new(12, 13);
        assert!(pins.owns(12));
        assert!(pins.owns(13));
        assert!(!pins.owns(0));
    }
}
