//! Edge routing by pin
//!
//! All encoder pins share one edge entry point. The registry maps the pin that
//! fired to the decoder owning it, so any number of encoders can be decoded
//! side by side without per-instance globals. It is filled once at startup and
//! only read afterwards.

use crate::decoder::{ChannelLevels, QuadratureDecoder, Step};
use crate::error::ConfigError;

/// Fixed capacity table of decoders keyed by their channel pins
pub struct EncoderRegistry<'a, const N: usize> {
    slots: [Option<&'a QuadratureDecoder>; N],
}

impl<'a, const N: usize> EncoderRegistry<'a, N> {
    pub const fn new() -> Self {
        Self { slots: [None; N] }
    }

    /// Add a decoder, returns its slot index
    pub fn register(&mut self, decoder: &'a QuadratureDecoder) -> Result<usize, ConfigError> {
        let pins = decoder.pins();
        if pins.a == pins.b {
            return Err(ConfigError::SharedChannelPin(pins.a));
        }

        for registered in self.iter() {
            if registered.pins().owns(pins.a) {
                return Err(ConfigError::PinAlreadyRegistered(pins.a));
            }
            if registered.pins().owns(pins.b) {
                return Err(ConfigError::PinAlreadyRegistered(pins.b));
            }
        }

        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.is_none())
            .ok_or(ConfigError::RegistryFull)?;
        *slot = Some(decoder);
        Ok(index)
    }

    /// Decoder owning `pin`, if any
    pub fn lookup(&self, pin: u8) -> Option<&'a QuadratureDecoder> {
        self.iter().find(|decoder| decoder.pins().owns(pin))
    }

    /// Route an edge on `pin` to its decoder
    ///
    /// `read` is the channel level primitive: it returns the current level of
    /// a GPIO. Both channels of the owning encoder are read, whichever one
    /// fired. Returns `None` for unknown pins and for edges without a level
    /// change.
    pub fn dispatch(&self, pin: u8, read: impl Fn(u8) -> bool) -> Option<Step> {
        let decoder = self.lookup(pin)?;
        let pins = decoder.pins();
        decoder.on_edge(ChannelLevels::new(read(pins.a), read(pins.b)))
    }

    /// Feed the current levels of every registered encoder to its decoder
    ///
    /// Catches edges that landed while no wait was armed. Encoders whose
    /// levels did not move are left alone. Returns the number of decoded
    /// steps.
    pub fn sweep(&self, read: impl Fn(u8) -> bool) -> usize {
        self.iter()
            .filter_map(|decoder| {
                let pins = decoder.pins();
                decoder.on_edge(ChannelLevels::new(read(pins.a), read(pins.b)))
            })
            .count()
    }

    /// Registered decoders in slot order
    pub fn iter(&self) -> impl Iterator<Item = &'a QuadratureDecoder> + '_ {
        self.slots.iter().flatten().copied()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<const N: usize> Default for EncoderRegistry<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}
