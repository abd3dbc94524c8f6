//! Operator Commands
//!
//! Commands reach the tasks through embassy-sync Signals. A newer command
//! replaces one that was not picked up yet.
//!
//! - target and halt commands go to the control loop
//! - encoder resets go to the sampling task, which resets the decoders and
//!   rebases its samplers in the same step

use defmt::Format;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use motion_core::Rotation;

/// Pending command for the control loop
static DRIVE: Signal<CriticalSectionRawMutex, Command> = Signal::new();

/// Pending encoder reset request for the sampling task
static ENCODER_RESET: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Operator commands
#[derive(Debug, Clone, Copy, Format)]
pub enum Command {
    /// Track a wheel speed (RPM) in the given direction
    SetTarget { rpm: f32, rotation: Rotation },
    /// Drop the target and stop the motors
    Halt,
    /// Zero tick counts, direction and distance of all encoders
    ResetEncoders,
}

/// Issues a command, never blocks
pub fn update(command: Command) {
    match command {
        Command::ResetEncoders => ENCODER_RESET.signal(()),
        command => DRIVE.signal(command),
    }
}

/// Takes the pending control loop command, if any
pub fn take_drive_command() -> Option<Command> {
    DRIVE.try_take()
}

/// Whether an encoder reset was requested since the last call
pub fn take_encoder_reset() -> bool {
    ENCODER_RESET.try_take().is_some()
}
