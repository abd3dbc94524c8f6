//! Drive Task Module
//!
//! Closed-loop speed control of both wheel motors. Runs in thread mode, below
//! edge decoding and sampling.
//!
//! Every control period each wheel's PID reads the latest sampled rate and
//! produces a throttle, which is mapped onto the H-bridge as direction plus duty
//! cycle through the TB6612FNG-style motor driver.
//!
//! Rates and throttle are signed the same way: clockwise is positive, forward
//! on the bridge, and counts up on the encoder.

use defmt::{debug, info, unwrap, warn};
use embassy_rp::gpio::{Level, Output};
use embassy_rp::pwm::{self, Pwm, PwmOutput};
use embassy_time::Ticker;
use motion_core::{MotorDemand, MotorDirection, SpeedPid};
use tb6612fng::{DriveCommand, Motor};

use crate::system::command::{self, Command};
use crate::system::config;
use crate::system::encoders::Wheel;
use crate::system::resources::MotorDriverResources;

/// One bridge channel: direction inputs plus a PWM enable
type BridgeMotor = Motor<Output<'static>, Output<'static>, PwmOutput<'static>>;

/// Speed loop of one wheel
struct WheelDrive {
    wheel: Wheel,
    pid: SpeedPid,
    motor: BridgeMotor,
}

impl WheelDrive {
    /// Run one control step, does nothing while no target is set
    fn step(&mut self) {
        if self.pid.target().is_none() {
            return;
        }

        let measured_rpm = self.wheel.metrics().rate();
        let throttle = self.pid.update(measured_rpm);
        let terms = self.pid.terms();
        debug!(
            "{} rpm {} err {} p {} i {} d {} throttle {}",
            self.wheel,
            measured_rpm,
            self.pid.last_error(),
            terms.p,
            terms.i,
            terms.d,
            throttle
        );

        self.apply(MotorDemand::from_throttle(throttle));
    }

    fn halt(&mut self) {
        self.pid.halt();
        self.apply(MotorDemand::STOP);
    }

    fn apply(&mut self, demand: MotorDemand) {
        let drive_command = match demand.direction {
            MotorDirection::Forward => DriveCommand::Forward(demand.duty_percent),
            MotorDirection::Backward => DriveCommand::Backward(demand.duty_percent),
            MotorDirection::Stop => DriveCommand::Stop,
        };
        if self.motor.drive(drive_command).is_err() {
            warn!("{} motor rejected {}", self.wheel, demand);
        }
    }
}

#[embassy_executor::task]
pub async fn drive(r: MotorDriverResources) {
    // Calculate minimum divider needed to keep period under 16-bit limit (65535)
    let clock_freq_hz = embassy_rp::clocks::clk_sys_freq();
    let divider = ((clock_freq_hz / config::PWM_FREQUENCY_HZ) / 65535 + 1) as u8;
    let period = (clock_freq_hz / (config::PWM_FREQUENCY_HZ * divider as u32)) as u16 - 1;

    let mut pwm_config = pwm::Config::default();
    pwm_config.divider = divider.into();
    pwm_config.top = period;

    // Both enable pins sit on slice 3, channel A left and channel B right
    let pwm = Pwm::new_output_ab(r.pwm_slice, r.left_enable, r.right_enable, pwm_config);
    let (left_pwm, right_pwm) = pwm.split();

    let left_motor = Motor::new(
        Output::new(r.left_in1, Level::Low),
        Output::new(r.left_in2, Level::Low),
        unwrap!(left_pwm),
    )
    .unwrap();
    let right_motor = Motor::new(
        Output::new(r.right_in1, Level::Low),
        Output::new(r.right_in2, Level::Low),
        unwrap!(right_pwm),
    )
    .unwrap();

    let pid_config = config::pid_config();
    let mut wheels = [
        WheelDrive {
            wheel: Wheel::Left,
            pid: unwrap!(SpeedPid::new(pid_config)),
            motor: left_motor,
        },
        WheelDrive {
            wheel: Wheel::Right,
            pid: unwrap!(SpeedPid::new(pid_config)),
            motor: right_motor,
        },
    ];
    info!("Speed control every {} ms", config::CONTROL_PERIOD.as_millis());

    let mut ticker = Ticker::every(config::CONTROL_PERIOD);
    loop {
        ticker.next().await;

        match command::take_drive_command() {
            Some(Command::SetTarget { rpm, rotation }) => {
                info!("New target {} rpm {}", rpm, rotation);
                for wheel in wheels.iter_mut() {
                    wheel.pid.set_target(rpm, rotation);
                }
            }
            Some(Command::Halt) => {
                info!("Halting motors");
                for wheel in wheels.iter_mut() {
                    wheel.halt();
                }
            }
            // handled by the sampling task
            Some(Command::ResetEncoders) | None => {}
        }

        for wheel in wheels.iter_mut() {
            wheel.step();
        }
    }
}
