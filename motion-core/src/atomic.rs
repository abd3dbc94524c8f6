//! `f32` cell shared between execution contexts
//!
//! Cortex-M has no atomic float type, but an `f32` fits the native word, so it
//! is stored as its bit pattern in an [`AtomicU32`]. A reader always sees a
//! whole value, either the old one or the new one.

use core::sync::atomic::{AtomicU32, Ordering};

/// Single-writer float cell
#[derive(Debug)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    /// A cell holding `0.0` (its bit pattern is all zeros), usable in statics
    pub const fn zero() -> Self {
        Self(AtomicU32::new(0))
    }

    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Acquire))
    }

    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Release);
    }
}

impl Default for AtomicF32 {
    fn default() -> Self {
        Self::zero()
    }
}
