//! Simulated ports for running the loop without a board.
//!
//! Everything here is fixed-capacity so it builds for the target as well.

use heapless::{Deque, HistoryBuffer, Vec};

use crate::pacing::Pacer;
use crate::ports::{DiscreteInputPort, DiscreteOutputPort, GpioController, GpioPort, InitError};

/// Replays a queue of words, then keeps returning the last one.
#[derive(Debug, Default)]
pub struct ScriptedInput<const N: usize> {
    script: Deque<u32, N>,
    last: u32,
}

impl<const N: usize> ScriptedInput<N> {
    pub const fn new() -> Self {
        Self { script: Deque::new(), last: 0 }
    }

    /// Queue up to `N` values; anything past that is dropped.
    pub fn from_slice(values: &[u32]) -> Self {
        let mut input = Self::new();
        for &value in values.iter().take(N) {
            let _ = input.push(value);
        }
        input
    }

    /// Queue one more value. Hands it back if the script is full.
    pub fn push(&mut self, value: u32) -> Result<(), u32> {
        self.script.push_back(value)
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl<const N: usize> DiscreteInputPort for ScriptedInput<N> {
    fn read(&mut self) -> u32 {
        if let Some(value) = self.script.pop_front() {
            self.last = value;
        }
        self.last
    }
}

/// Remembers the last `N` words written to it.
#[derive(Default)]
pub struct RecordingOutput<const N: usize> {
    history: HistoryBuffer<u32, N>,
    writes: u32,
}

impl<const N: usize> RecordingOutput<N> {
    pub const fn new() -> Self {
        Self { history: HistoryBuffer::new(), writes: 0 }
    }

    pub fn last(&self) -> Option<u32> {
        self.history.recent().copied()
    }

    /// Total writes seen, including ones that fell out of the history.
    pub fn writes(&self) -> u32 {
        self.writes
    }

    /// Retained writes, oldest first.
    pub fn history(&self) -> impl Iterator<Item = u32> + '_ {
        self.history.oldest_ordered().copied()
    }
}

impl<const N: usize> DiscreteOutputPort for RecordingOutput<N> {
    fn write(&mut self, value: u32) {
        self.history.write(value);
        self.writes = self.writes.wrapping_add(1);
    }
}

/// A single simulated GPIO channel.
#[derive(Debug)]
pub struct SimGpio {
    device_id: u16,
    direction: Option<u32>,
    input: u32,
    last_write: Option<u32>,
}

impl SimGpio {
    pub const fn new(device_id: u16) -> Self {
        Self { device_id, direction: None, input: 0, last_write: None }
    }

    pub fn device_id(&self) -> u16 {
        self.device_id
    }

    /// The mask from the last `set_direction`, if any.
    pub fn direction(&self) -> Option<u32> {
        self.direction
    }

    /// Level the input lines will report from now on.
    pub fn set_input(&mut self, value: u32) {
        self.input = value;
    }

    pub fn last_write(&self) -> Option<u32> {
        self.last_write
    }
}

impl DiscreteInputPort for SimGpio {
    fn read(&mut self) -> u32 {
        self.input
    }
}

impl DiscreteOutputPort for SimGpio {
    fn write(&mut self, value: u32) {
        self.last_write = Some(value);
    }
}

impl GpioPort for SimGpio {
    fn set_direction(&mut self, mask: u32) {
        self.direction = Some(mask);
    }
}

/// Up to this many devices per simulated controller.
pub const SIM_MAX_DEVICES: usize = 8;

/// Hands out [`SimGpio`]s for a configurable set of device ids.
#[derive(Debug, Default)]
pub struct SimController {
    present: Vec<u16, SIM_MAX_DEVICES>,
    absent: Vec<u16, SIM_MAX_DEVICES>,
    bound: Vec<u16, SIM_MAX_DEVICES>,
    attempts: u32,
}

impl SimController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_devices(ids: &[u16]) -> Self {
        let mut controller = Self::new();
        for &id in ids {
            controller.add_device(id);
        }
        controller
    }

    /// Returns false when the controller is full.
    pub fn add_device(&mut self, device_id: u16) -> bool {
        self.present.push(device_id).is_ok()
    }

    /// Known to the hardware build, but not answering.
    pub fn mark_absent(&mut self, device_id: u16) -> bool {
        self.absent.push(device_id).is_ok()
    }

    /// Number of `initialize` calls so far, failed or not.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

impl GpioController for SimController {
    type Port = SimGpio;

    fn initialize(&mut self, device_id: u16) -> Result<SimGpio, InitError> {
        self.attempts += 1;

        if self.absent.contains(&device_id) {
            return Err(InitError::DeviceAbsent { device_id });
        }
        if !self.present.contains(&device_id) {
            return Err(InitError::DeviceNotFound { device_id });
        }
        if self.bound.contains(&device_id) {
            return Err(InitError::AlreadyBound { device_id });
        }

        // `bound` can't fill up before `present` does.
        let _ = self.bound.push(device_id);
        Ok(SimGpio::new(device_id))
    }
}

/// A pacer that doesn't wait, only counts.
#[derive(Debug, Default, Clone, Copy)]
pub struct TickCounter {
    ticks: u64,
}

impl TickCounter {
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Pacer for TickCounter {
    fn pace(&mut self) {
        self.ticks += 1;
    }
}
