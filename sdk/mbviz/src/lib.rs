//! # mbviz
//!
//! The sampling-and-decay loop behind a softcore audio visualizer.
//!
//! Every 5 ms the loop reads a raw volume word from a GPIO input, turns it
//! into a bar height, lets a peak marker snap up to it (or slowly fall back),
//! and writes both to the display hardware as one packed word:
//!
//! ```text
//!  31            16 15             0
//! +----------------+----------------+
//! |  peak height   |   bar height   |
//! +----------------+----------------+
//! ```
//!
//! Hardware is only reached through the traits in [`ports`], so the same loop
//! runs on the board, in the host simulator and under `cargo test`.

#![cfg_attr(not(test), no_std)]

pub mod consts;
pub mod meter;
pub mod pacing;
pub mod peripherals;
pub mod ports;
pub mod sim;
pub mod visualizer;

pub use meter::{Frame, LoopState};
pub use pacing::Pacer;
pub use peripherals::{bring_up, Binding, BringUpError, DeviceIds, InitPolicy, Peripherals, Role};
pub use ports::{DiscreteInputPort, DiscreteOutputPort, GpioController, GpioPort, InitError};
pub use visualizer::Visualizer;
