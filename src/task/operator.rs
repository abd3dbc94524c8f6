//! Operator button handling
//!
//! One push button drives the operator commands:
//! - short press: reset the encoder counts
//! - hold: toggle between halt and tracking the configured target

use defmt::info;
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::{Input, Pull};
use embassy_time::{Duration, Timer};

use crate::system::command::{self, Command};
use crate::system::config;
use crate::system::resources::OperatorResources;

/// Button hold threshold (ms)
const HOLD_DURATION: Duration = Duration::from_millis(700);

/// Button debounce delay (ms)
const DEBOUNCE_DURATION: Duration = Duration::from_millis(30);

#[embassy_executor::task]
pub async fn operator_button(r: OperatorResources) {
    let mut button = Input::new(r.button_pin, Pull::Down);
    // main sets the power-up target
    let mut running = true;

    loop {
        wait_for_press(&mut button).await;

        match select(Timer::after(HOLD_DURATION), button.wait_for_low()).await {
            Either::First(()) => {
                running = !running;
                if running {
                    info!("Operator: run");
                    command::update(Command::SetTarget {
                        rpm: config::TARGET_RPM,
                        rotation: config::TARGET_ROTATION,
                    });
                } else {
                    info!("Operator: halt");
                    command::update(Command::Halt);
                }
                button.wait_for_low().await;
            }
            Either::Second(()) => {
                info!("Operator: reset encoders");
                command::update(Command::ResetEncoders);
            }
        }

        // let the release bounce die out
        Timer::after(DEBOUNCE_DURATION).await;
    }
}

/// Returns once the button went high and is still high after the debounce delay
async fn wait_for_press(button: &mut Input<'static>) {
    loop {
        button.wait_for_high().await;
        Timer::after(DEBOUNCE_DURATION).await;
        if button.is_high() {
            return;
        }
        button.wait_for_low().await;
    }
}
