//! Tick-to-metrics sampling
//!
//! Medium priority task: preempts the control loop, is preempted by edge
//! decoding. Once per sampling period it closes the current window of every
//! wheel and publishes RPM, speed, distance and rotations.
//!
//! The window length handed to the samplers is measured, so a late ticker
//! does not inflate the rate.
//!
//! Encoder resets requested by the operator are executed here: decoder reset
//! and sampler rebase happen in the same step, so the counter jump never
//! shows up as motion.

use defmt::{debug, info, unwrap};
use embassy_time::{Instant, Ticker};
use motion_core::Sampler;

use crate::system::command;
use crate::system::config;
use crate::system::encoders::Wheel;

#[embassy_executor::task]
pub async fn sample() {
    let encoder_config = config::encoder_config();
    let mut samplers = Wheel::ALL
        .map(|wheel| unwrap!(Sampler::new(wheel.decoder(), wheel.metrics(), encoder_config)));
    info!("Sampling every {} ms", config::SAMPLE_PERIOD.as_millis());

    let mut ticker = Ticker::every(config::SAMPLE_PERIOD);
    let mut window_start = Instant::now();

    loop {
        ticker.next().await;

        let now = Instant::now();
        let elapsed_us = (now - window_start).as_micros();
        window_start = now;

        if command::take_encoder_reset() {
            for (wheel, sampler) in Wheel::ALL.into_iter().zip(samplers.iter_mut()) {
                wheel.decoder().reset();
                sampler.rebase();
            }
            info!("Encoder counts reset");
            continue;
        }

        for sampler in samplers.iter_mut() {
            sampler.tick_elapsed(elapsed_us);
        }

        if elapsed_us > config::SAMPLE_PERIOD.as_micros() * 3 / 2 {
            debug!("Late sampling window: {} us", elapsed_us);
        }
    }
}
