//! Encoder drive firmware entry point
//!
//! Initializes the RP2350, splits the peripherals and starts the tasks on three
//! executors, one per timing domain:
//!
//! | Executor | Priority | Tasks |
//! | -------- | -------- | ----- |
//! | `SWI_IRQ_1` interrupt executor | highest | edge decoding |
//! | `SWI_IRQ_0` interrupt executor | medium | tick-to-metrics sampling |
//! | thread executor | lowest | speed control, reporting, operator button |
//!
//! Each level preempts the ones below it. State crossing levels is atomic, see
//! `motion_core`.

#![no_std]
#![no_main]

use crate::system::command::{self, Command};
use crate::system::config;
use crate::task::{
    drive::drive, edge_decode::edge_decode, operator::operator_button, report::report,
    sample::sample,
};
use cortex_m_rt::entry;
use defmt::info;
use embassy_executor::{Executor, InterruptExecutor};
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use static_cell::StaticCell;
use system::resources::{
    AssignedResources, EncoderResources, MotorDriverResources, OperatorResources,
};
use {defmt_rtt as _, panic_probe as _};

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

/// System core modules
mod system;
/// Task implementations
mod task;

/// Edge decoding executor
static EXECUTOR_EDGES: InterruptExecutor = InterruptExecutor::new();
/// Sampling executor
static EXECUTOR_SAMPLING: InterruptExecutor = InterruptExecutor::new();
/// Thread mode executor for everything else
static EXECUTOR_CONTROL: StaticCell<Executor> = StaticCell::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_EDGES.on_interrupt()
}

#[interrupt]
unsafe fn SWI_IRQ_0() {
    EXECUTOR_SAMPLING.on_interrupt()
}

/// Firmware entry point
#[entry]
fn main() -> ! {
    let p = embassy_rp::init(Config::default());

    // Split the resources into separate groups for each task
    let r = split_resources!(p);

    info!(
        "Encoder drive: CPR {}, wheel radius {} cm, target {} rpm",
        config::COUNTS_PER_REVOLUTION,
        config::WHEEL_RADIUS_CM,
        config::TARGET_RPM
    );

    // Edge decoding first, so no edge is lost while the rest starts up
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let spawner = EXECUTOR_EDGES.start(interrupt::SWI_IRQ_1);
    spawner.spawn(edge_decode(r.encoders)).unwrap();

    // Then the sampler that consumes the tick counts
    interrupt::SWI_IRQ_0.set_priority(Priority::P3);
    let spawner = EXECUTOR_SAMPLING.start(interrupt::SWI_IRQ_0);
    spawner.spawn(sample()).unwrap();

    // Power-up target, picked up by the first control step
    command::update(Command::SetTarget {
        rpm: config::TARGET_RPM,
        rotation: config::TARGET_ROTATION,
    });

    let executor = EXECUTOR_CONTROL.init(Executor::new());
    executor.run(|spawner| {
        spawner.spawn(drive(r.motor_driver)).unwrap();
        spawner.spawn(report()).unwrap();
        spawner.spawn(operator_button(r.operator)).unwrap();
    })
}
