//! Tick-to-metrics sampler
//!
//! Runs once per sampling period in the periodic context. It reads the tick
//! counter, takes the delta against the previous window and publishes the
//! derived metrics into a [`MotionMetrics`] block that the control loop and the
//! reporter read from their own contexts.
//!
//! # Formulas
//! With Δ the tick delta of the window and T the window length in seconds:
//! - rate (RPM) = Δ × (60 / T) / CPR
//! - Δdistance (cm) = (Δ / CPR) × 2π × wheel radius
//! - speed (cm/s) = Δdistance / T
//! - rotations = ticks / CPR (absolute position, not reset by the sampler)
//!
//! Distance accumulates signed contributions, reversing reduces it.
//!
//! # Timing
//! [`Sampler::tick`] assumes exactly one nominal period passed since the last
//! call. When the trigger is late the delta covers more time than assumed and
//! rate and speed are off by the same ratio. [`Sampler::tick_elapsed`] takes the
//! measured window length instead.

use core::f32::consts::PI;

use crate::atomic::AtomicF32;
use crate::decoder::{Direction, QuadratureDecoder, TickSource};
use crate::error::ConfigError;

/// Encoder and wheel geometry plus the sampling period
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderConfig {
    /// Ticks per full output shaft revolution
    pub counts_per_revolution: u32,
    /// Wheel radius in cm
    pub wheel_radius_cm: f32,
    /// Nominal sampling period in µs
    pub sample_period_us: u32,
}

impl EncoderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.counts_per_revolution == 0 {
            return Err(ConfigError::ZeroCountsPerRevolution);
        }
        if self.sample_period_us == 0 {
            return Err(ConfigError::ZeroSamplePeriod);
        }
        if !self.wheel_radius_cm.is_finite() || self.wheel_radius_cm <= 0.0 {
            return Err(ConfigError::InvalidWheelRadius);
        }
        Ok(())
    }

    /// Nominal sampling period in seconds
    pub fn period_s(&self) -> f32 {
        self.sample_period_us as f32 / 1_000_000.0
    }

    /// Wheel circumference in cm
    pub fn perimeter_cm(&self) -> f32 {
        2.0 * PI * self.wheel_radius_cm
    }
}

/// Latest metrics of one encoder, written by its sampler only
///
/// Every field is read on its own, a reader may see the rate of one window
/// next to the distance of the following one.
#[derive(Debug, Default)]
pub struct MotionMetrics {
    rate_rpm: AtomicF32,
    speed_cm_s: AtomicF32,
    distance_cm: AtomicF32,
    rotations: AtomicF32,
}

impl MotionMetrics {
    pub const fn new() -> Self {
        Self {
            rate_rpm: AtomicF32::zero(),
            speed_cm_s: AtomicF32::zero(),
            distance_cm: AtomicF32::zero(),
            rotations: AtomicF32::zero(),
        }
    }

    /// Revolutions per minute over the last window, signed
    pub fn rate(&self) -> f32 {
        self.rate_rpm.load()
    }

    /// Linear speed in cm/s over the last window, signed
    pub fn speed(&self) -> f32 {
        self.speed_cm_s.load()
    }

    /// Distance in cm since start or the last rebase
    pub fn distance(&self) -> f32 {
        self.distance_cm.load()
    }

    /// Absolute position in revolutions
    pub fn rotations(&self) -> f32 {
        self.rotations.load()
    }
}

/// Everything worth reporting about one encoder at one point in time
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MetricsSnapshot {
    pub ticks: i32,
    pub direction: Direction,
    pub rate_rpm: f32,
    pub speed_cm_s: f32,
    pub distance_cm: f32,
    pub rotations: f32,
}

impl MetricsSnapshot {
    pub fn capture(decoder: &QuadratureDecoder, metrics: &MotionMetrics) -> Self {
        Self {
            ticks: decoder.ticks(),
            direction: decoder.direction(),
            rate_rpm: metrics.rate(),
            speed_cm_s: metrics.speed(),
            distance_cm: metrics.distance(),
            rotations: metrics.rotations(),
        }
    }
}

/// Periodic tick-to-metrics converter for one encoder
pub struct Sampler<'a, T: TickSource> {
    source: &'a T,
    metrics: &'a MotionMetrics,
    config: EncoderConfig,
    /// Tick count captured at the start of the current window
    previous_ticks: i32,
    distance_cm: f32,
}

impl<'a, T: TickSource> Sampler<'a, T> {
    /// Build a sampler, rejecting a zero CPR, zero period or bad wheel radius
    ///
    /// The first window starts at the tick count present now.
    pub fn new(
        source: &'a T,
        metrics: &'a MotionMetrics,
        config: EncoderConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            source,
            metrics,
            config,
            previous_ticks: source.ticks(),
            distance_cm: metrics.distance(),
        })
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Close a window of exactly one nominal period
    pub fn tick(&mut self) {
        self.sample(self.config.period_s());
    }

    /// Close a window that lasted `elapsed_us`
    ///
    /// A zero length window falls back to the nominal period.
    pub fn tick_elapsed(&mut self, elapsed_us: u64) {
        if elapsed_us == 0 {
            self.tick();
        } else {
            self.sample(elapsed_us as f32 / 1_000_000.0);
        }
    }

    /// Start over after the decoder was reset
    ///
    /// Takes the current count as the new window start and zeroes distance, so
    /// the jump of the counter is not taken for motion.
    pub fn rebase(&mut self) {
        let current = self.source.ticks();
        self.previous_ticks = current;
        self.distance_cm = 0.0;

        self.metrics.rate_rpm.store(0.0);
        self.metrics.speed_cm_s.store(0.0);
        self.metrics.distance_cm.store(0.0);
        self.metrics
            .rotations
            .store(current as f32 / self.config.counts_per_revolution as f32);
    }

    fn sample(&mut self, window_s: f32) {
        let current = self.source.ticks();
        let delta = current.wrapping_sub(self.previous_ticks);
        self.previous_ticks = current;

        let cpr = self.config.counts_per_revolution as f32;
        let revolutions = delta as f32 / cpr;
        let step_cm = revolutions * self.config.perimeter_cm();
        self.distance_cm += step_cm;

        self.metrics.rate_rpm.store(revolutions * (60.0 / window_s));
        self.metrics.speed_cm_s.store(step_cm / window_s);
        self.metrics.distance_cm.store(self.distance_cm);
        self.metrics.rotations.store(current as f32 / cpr);
    }

    pub fn rate(&self) -> f32 {
        self.metrics.rate()
    }

    pub fn speed(&self) -> f32 {
        self.metrics.speed()
    }

    pub fn distance(&self) -> f32 {
        self.metrics.distance()
    }

    pub fn rotations(&self) -> f32 {
        self.metrics.rotations()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FakeTicks(Cell<i32>);

    impl FakeTicks {
        fn at(ticks: i32) -> Self {
            Self(Cell::new(ticks))
        }

        fn advance(&self, delta: i32) {
            self.0.set(self.0.get().wrapping_add(delta));
        }
    }

    impl TickSource for FakeTicks {
        fn ticks(&self) -> i32 {
            self.0.get()
        }
    }

    const CONFIG: EncoderConfig = EncoderConfig {
        counts_per_revolution: 330,
        wheel_radius_cm: 3.0,
        sample_period_us: 100_000,
    };

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-3,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn one_revolution_per_window() {
        let ticks = FakeTicks::at(0);
        let metrics = MotionMetrics::new();
        let mut sampler = Sampler::new(&ticks, &metrics, CONFIG).unwrap();

        ticks.advance(330);
        sampler.tick();

        assert_close(sampler.rotations(), 1.0);
        assert_close(sampler.rate(), 600.0);
        assert_close(sampler.distance(), 2.0 * PI * 3.0);
        assert_close(sampler.distance(), 18.85);
        assert_close(sampler.speed(), 188.4956);
    }

    #[test]
    fn distance_accumulates_signed() {
        let ticks = FakeTicks::at(0);
        let metrics = MotionMetrics::new();
        let mut sampler = Sampler::new(&ticks, &metrics, CONFIG).unwrap();

        ticks.advance(660);
        sampler.tick();
        ticks.advance(-330);
        sampler.tick();

        assert_close(metrics.distance(), 2.0 * PI * 3.0);
        assert_close(metrics.rate(), -600.0);
        assert!(metrics.speed() < 0.0);
        assert_close(metrics.rotations(), 1.0);
    }

    #[test]
    fn idle_window_reports_zero_rate() {
        let ticks = FakeTicks::at(990);
        let metrics = MotionMetrics::new();
        let mut sampler = Sampler::new(&ticks, &metrics, CONFIG).unwrap();

        sampler.tick();

        assert_eq!(metrics.rate(), 0.0);
        assert_eq!(metrics.speed(), 0.0);
        assert_eq!(metrics.distance(), 0.0);
        assert_close(metrics.rotations(), 3.0);
    }

    #[test]
    fn measured_window_scales_rate() {
        let ticks = FakeTicks::at(0);
        let metrics = MotionMetrics::new();
        let mut sampler = Sampler::new(&ticks, &metrics, CONFIG).unwrap();

        // trigger came twice as late as planned
        ticks.advance(330);
        sampler.tick_elapsed(200_000);
        assert_close(metrics.rate(), 300.0);
        assert_close(metrics.distance(), 18.849556);

        ticks.advance(33);
        sampler.tick_elapsed(0);
        assert_close(metrics.rate(), 60.0);
    }

    #[test]
    fn counter_wrap_is_a_small_delta() {
        let ticks = FakeTicks::at(i32::MAX - 100);
        let metrics = MotionMetrics::new();
        let mut sampler = Sampler::new(&ticks, &metrics, CONFIG).unwrap();

        ticks.advance(330);
        sampler.tick();

        assert_close(metrics.rate(), 600.0);
    }

    #[test]
    fn rebase_after_decoder_reset() {
        let ticks = FakeTicks::at(0);
        let metrics = MotionMetrics::new();
        let mut sampler = Sampler::new(&ticks, &metrics, CONFIG).unwrap();

        ticks.advance(3300);
        sampler.tick();
        assert!(metrics.distance() > 0.0);

        ticks.0.set(0);
        sampler.rebase();
        assert_eq!(metrics.distance(), 0.0);
        assert_eq!(metrics.rate(), 0.0);
        assert_eq!(metrics.rotations(), 0.0);

        ticks.advance(165);
        sampler.tick();
        assert_close(metrics.rate(), 300.0);
        assert_close(metrics.distance(), PI * 3.0);
    }

    #[test]
    fn rejects_zero_cpr_and_zero_period() {
        let ticks = FakeTicks::at(0);
        let metrics = MotionMetrics::new();

        let zero_cpr = EncoderConfig {
            counts_per_revolution: 0,
            ..CONFIG
        };
        assert_eq!(
            Sampler::new(&ticks, &metrics, zero_cpr).err(),
            Some(ConfigError::ZeroCountsPerRevolution)
        );

        let zero_period = EncoderConfig {
            sample_period_us: 0,
            ..CONFIG
        };
        assert_eq!(
            Sampler::new(&ticks, &metrics, zero_period).err(),
            Some(ConfigError::ZeroSamplePeriod)
        );
    }

    #[test]
    fn rejects_bad_wheel_radius() {
        for radius in [0.0, -3.0, f32::NAN, f32::INFINITY] {
            let config = EncoderConfig {
                wheel_radius_cm: radius,
                ..CONFIG
            };
            assert_eq!(config.validate(), Err(ConfigError::InvalidWheelRadius));
        }
    }

    #[test]
    fn snapshot_of_a_real_decoder() {
        use crate::decoder::{ChannelLevels, EncoderPins};

        let decoder = QuadratureDecoder::new(EncoderPins::new(0, 1));
        let metrics = MotionMetrics::new();
        let mut sampler = Sampler::new(&decoder, &metrics, CONFIG).unwrap();

        decoder.on_edge(ChannelLevels::new(false, true));
        decoder.on_edge(ChannelLevels::new(true, true));
        sampler.tick();

        let snapshot = MetricsSnapshot::capture(&decoder, &metrics);
        assert_eq!(snapshot.ticks, 2);
        assert_eq!(snapshot.direction, Direction::Forward);
        assert_close(snapshot.rate_rpm, 2.0 * 600.0 / 330.0);
        assert_close(snapshot.rotations, 2.0 / 330.0);
    }
}
