//! Quadrature edge decoding
//!
//! Highest priority task. Waits for a level change on any encoder pin, then
//! hands the pin that fired to the encoder registry, which reads both channels
//! of the owning encoder and updates its decoder.
//!
//! All four pins are watched from this one task, so both channels of every
//! encoder trigger decoding. Only the first pin to fire is reported per wait,
//! and an edge that lands between two waits is not latched. So every round
//! arms the waits first and then sweeps all encoders once, which picks up
//! whatever moved in between. The loop never blocks on anything but the edge
//! wait and takes no locks.

use core::pin::pin;
use core::task::Poll;

use defmt::{info, unwrap};
use embassy_futures::poll_once;
use embassy_futures::select::select_array;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::pac;
use motion_core::{ChannelLevels, EncoderRegistry};

use crate::system::config::{LEFT_ENCODER_PINS, RIGHT_ENCODER_PINS};
use crate::system::encoders::Wheel;
use crate::system::resources::EncoderResources;

/// GPIO number of every watched input, same order as the inputs array
const EDGE_PINS: [u8; 4] = [
    LEFT_ENCODER_PINS.a,
    LEFT_ENCODER_PINS.b,
    RIGHT_ENCODER_PINS.a,
    RIGHT_ENCODER_PINS.b,
];

#[embassy_executor::task]
pub async fn edge_decode(r: EncoderResources) {
    let mut inputs = [
        Input::new(r.left_a, Pull::Up),
        Input::new(r.left_b, Pull::Up),
        Input::new(r.right_a, Pull::Up),
        Input::new(r.right_b, Pull::Up),
    ];

    // Routing table, fixed from here on
    let mut registry = EncoderRegistry::<{ Wheel::ALL.len() }>::new();
    for wheel in Wheel::ALL {
        unwrap!(registry.register(wheel.decoder()));
    }

    for decoder in registry.iter() {
        let pins = decoder.pins();
        decoder.attach(ChannelLevels::new(level(pins.a), level(pins.b)));
    }
    info!("Decoding {} encoders on pins {}", registry.len(), EDGE_PINS);

    loop {
        let mut edges = pin!(select_array(
            inputs.each_mut().map(|input| input.wait_for_any_edge())
        ));

        // First poll arms the edge interrupt of every pin
        let armed = poll_once(edges.as_mut());
        registry.sweep(level);

        let (_, fired) = match armed {
            Poll::Ready(edge) => edge,
            Poll::Pending => edges.await,
        };
        registry.dispatch(EDGE_PINS[fired], level);
    }
}

/// Channel level primitive: current level of a bank 0 GPIO
///
/// Reads the SIO input register directly, the `Input`s stay borrowed by the
/// armed edge waits.
fn level(pin: u8) -> bool {
    pac::SIO.gpio_in(0).read() & (1 << pin) != 0
}
