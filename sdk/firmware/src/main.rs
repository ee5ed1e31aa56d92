#![no_std]
#![no_main]

use log::{error, info, LevelFilter};
use mbviz::bring_up;

use crate::axi_gpio::AxiGpioController;
use crate::boot::{halt, init_platform, UsleepPacer};

mod axi_gpio;
mod boot;
mod console;
mod params;

#[unsafe(no_mangle)]
extern "C" fn main() -> i32 {
    unsafe { init_platform() };
    console::init(LevelFilter::Info);
    info!("\n=== Audio Visualizer Started ===");

    let mut gpio = AxiGpioController::new(&params::GPIO_DEVICES);
    let peripherals = match bring_up(&mut gpio, params::DEVICE_IDS, params::INIT_POLICY) {
        Ok(peripherals) => peripherals,
        Err(err) => {
            error!("{}, not starting the visualizer", err);
            halt();
        }
    };

    info!("Starting Visualizer Loop...");
    peripherals.into_visualizer().run(&mut UsleepPacer)
}
