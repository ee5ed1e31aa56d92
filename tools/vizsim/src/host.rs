//! The simulated board: a GPIO controller whose ports are a signal generator,
//! a status word and a trace writer.

use std::io::Write;
use std::thread;

use mbviz::consts::{ALL_INPUTS, ALL_OUTPUTS};
use mbviz::pacing::LOOP_PERIOD;
use mbviz::{
    DeviceIds, DiscreteInputPort, DiscreteOutputPort, GpioController, GpioPort, InitError, Pacer,
    Role,
};
use tracing::{debug, warn};

use crate::render::TraceSink;
use crate::signal::SignalPort;

/// Device ids of the simulated board, matching the generic AXI GPIO numbering.
pub const SIM_IDS: DeviceIds = DeviceIds { status: 0, volume: 1, gfx: 2 };

pub enum HostPort<W: Write> {
    Switches(u32),
    Volume(SignalPort),
    Display(TraceSink<W>),
}

impl<W: Write> HostPort<W> {
    fn expected_direction(&self) -> u32 {
        match self {
            HostPort::Display(_) => ALL_OUTPUTS,
            _ => ALL_INPUTS,
        }
    }
}

impl<W: Write> DiscreteInputPort for HostPort<W> {
    fn read(&mut self) -> u32 {
        match self {
            HostPort::Switches(word) => *word,
            HostPort::Volume(signal) => signal.read(),
            HostPort::Display(_) => 0,
        }
    }
}

impl<W: Write> DiscreteOutputPort for HostPort<W> {
    fn write(&mut self, value: u32) {
        match self {
            HostPort::Display(sink) => sink.write(value),
            _ => warn!("dropped write of {:#010x} to an input port", value),
        }
    }
}

impl<W: Write> GpioPort for HostPort<W> {
    fn set_direction(&mut self, mask: u32) {
        let expected = self.expected_direction();
        if mask != expected {
            warn!("direction {:#010x} doesn't match the wiring ({:#010x})", mask, expected);
        } else {
            debug!("direction set to {:#010x}", mask);
        }
    }
}

pub struct HostController<W: Write> {
    status: u32,
    volume: Option<SignalPort>,
    display: Option<TraceSink<W>>,
    unplugged: Vec<Role>,
}

impl<W: Write> HostController<W> {
    pub fn new(status: u32, volume: SignalPort, display: TraceSink<W>) -> Self {
        Self { status, volume: Some(volume), display: Some(display), unplugged: Vec::new() }
    }

    /// Make the port for `role` fail to initialize.
    pub fn unplug(&mut self, role: Role) {
        if !self.unplugged.contains(&role) {
            self.unplugged.push(role);
        }
    }

    /// Gets the trace writer back if the display port was never bound.
    pub fn into_display(self) -> Option<TraceSink<W>> {
        self.display
    }
}

impl<W: Write> GpioController for HostController<W> {
    type Port = HostPort<W>;

    fn initialize(&mut self, device_id: u16) -> Result<HostPort<W>, InitError> {
        let role = Role::ALL
            .into_iter()
            .find(|role| SIM_IDS.get(*role) == device_id)
            .ok_or(InitError::DeviceNotFound { device_id })?;

        if self.unplugged.contains(&role) {
            return Err(InitError::DeviceAbsent { device_id });
        }

        let port = match role {
            Role::Status => Some(HostPort::Switches(self.status)),
            Role::Volume => self.volume.take().map(HostPort::Volume),
            Role::Gfx => self.display.take().map(HostPort::Display),
        };
        port.ok_or(InitError::AlreadyBound { device_id })
    }
}

/// Sleeps one loop period after each tick, like the board.
pub struct RealtimePacer;

impl Pacer for RealtimePacer {
    fn pace(&mut self) {
        thread::sleep(LOOP_PERIOD);
    }
}
