//! Bring-up of the three GPIO channels the visualizer uses.

use core::fmt;

use log::{debug, error, info};
use thiserror::Error;

use crate::consts::{ALL_INPUTS, ALL_OUTPUTS};
use crate::ports::{DiscreteInputPort, DiscreteOutputPort, GpioController, GpioPort, InitError};
use crate::visualizer::Visualizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Switch/status word. Configured but never read by the loop.
    Status,
    /// Raw volume from the audio hardware.
    Volume,
    /// Packed bar/peak word for the display hardware.
    Gfx,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Status, Role::Volume, Role::Gfx];

    pub const fn label(self) -> &'static str {
        match self {
            Role::Status => "Status",
            Role::Volume => "Volume",
            Role::Gfx => "Gfx",
        }
    }

    /// Direction mask applied right after a successful init.
    pub const fn direction(self) -> u32 {
        match self {
            Role::Status | Role::Volume => ALL_INPUTS,
            Role::Gfx => ALL_OUTPUTS,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Device identifiers from the hardware build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceIds {
    pub status: u16,
    pub volume: u16,
    pub gfx: u16,
}

impl DeviceIds {
    pub const fn get(&self, role: Role) -> u16 {
        match role {
            Role::Status => self.status,
            Role::Volume => self.volume,
            Role::Gfx => self.gfx,
        }
    }
}

/// What to do when a port fails to initialize.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InitPolicy {
    /// Report every failure, then refuse to start the loop.
    #[default]
    Strict,
    /// Report every failure and carry on. Failed ports read as zero and
    /// swallow writes.
    BestEffort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{role} GPIO init failed: {error}")]
pub struct BringUpError {
    pub role: Role,
    pub error: InitError,
}

/// A port that either came up or didn't.
#[derive(Debug)]
pub enum Binding<P> {
    Live(P),
    Unbound,
}

impl<P> Binding<P> {
    pub fn is_live(&self) -> bool {
        matches!(self, Binding::Live(_))
    }

    pub fn as_live(&self) -> Option<&P> {
        match self {
            Binding::Live(port) => Some(port),
            Binding::Unbound => None,
        }
    }

    pub fn into_live(self) -> Option<P> {
        match self {
            Binding::Live(port) => Some(port),
            Binding::Unbound => None,
        }
    }
}

impl<P: DiscreteInputPort> DiscreteInputPort for Binding<P> {
    #[inline]
    fn read(&mut self) -> u32 {
        match self {
            Binding::Live(port) => port.read(),
            Binding::Unbound => 0,
        }
    }
}

impl<P: DiscreteOutputPort> DiscreteOutputPort for Binding<P> {
    #[inline]
    fn write(&mut self, value: u32) {
        if let Binding::Live(port) = self {
            port.write(value);
        }
    }
}

/// The three configured channels.
#[derive(Debug)]
pub struct Peripherals<P> {
    pub status: Binding<P>,
    pub volume: Binding<P>,
    pub gfx: Binding<P>,
}

impl<P: GpioPort> Peripherals<P> {
    /// Current switch word. Reserved for callers outside the loop.
    pub fn read_status(&mut self) -> u32 {
        self.status.read()
    }

    pub fn binding(&self, role: Role) -> &Binding<P> {
        match role {
            Role::Status => &self.status,
            Role::Volume => &self.volume,
            Role::Gfx => &self.gfx,
        }
    }

    /// Hand volume and gfx to a fresh loop. The status port is released.
    pub fn into_visualizer(self) -> Visualizer<Binding<P>, Binding<P>> {
        Visualizer::new(self.volume, self.gfx)
    }
}

/// Initialize and direction-configure status, volume and gfx, in that order.
///
/// Each port is tried regardless of earlier failures, and each failure gets
/// its own diagnostic line. Under [`InitPolicy::Strict`] the first failure is
/// then returned.
pub fn bring_up<C: GpioController>(
    controller: &mut C,
    ids: DeviceIds,
    policy: InitPolicy,
) -> Result<Peripherals<C::Port>, BringUpError> {
    let mut first_failure = None;
    let mut bind = |role: Role| match controller.initialize(ids.get(role)) {
        Ok(mut port) => {
            port.set_direction(role.direction());
            debug!("{} GPIO bound to device {}", role, ids.get(role));
            Binding::Live(port)
        }
        Err(error) => {
            error!("Error: {} GPIO Init Failed ({})", role, error);
            first_failure.get_or_insert(BringUpError { role, error });
            Binding::Unbound
        }
    };

    let status = bind(Role::Status);
    let volume = bind(Role::Volume);
    let gfx = bind(Role::Gfx);

    if let (InitPolicy::Strict, Some(err)) = (policy, first_failure) {
        return Err(err);
    }

    info!("Hardware Initialized.");
    Ok(Peripherals { status, volume, gfx })
}
