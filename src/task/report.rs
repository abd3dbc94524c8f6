//! Metrics reporting
//!
//! Logs ticks, direction and the sampled metrics of every wheel over defmt.
//! Only reads, never changes anything.

use defmt::info;
use embassy_time::Ticker;

use crate::system::config;
use crate::system::encoders::Wheel;

#[embassy_executor::task]
pub async fn report() {
    let mut ticker = Ticker::every(config::REPORT_PERIOD);
    loop {
        ticker.next().await;
        for wheel in Wheel::ALL {
            let s = wheel.snapshot();
            info!(
                "{} | Ticks: {} | {} | RPM: {} | Speed: {} cm/s | Distance: {} cm | Rotations: {}",
                wheel, s.ticks, s.direction, s.rate_rpm, s.speed_cm_s, s.distance_cm, s.rotations
            );
        }
    }
}
