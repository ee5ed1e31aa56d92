//! Capability traits for discrete I/O ports.
//!
//! The loop never touches registers directly. A board driver, the host
//! simulator and the test doubles in [`crate::sim`] all plug in here.

use thiserror::Error;

/// A port whose lines can be sampled as one word.
pub trait DiscreteInputPort {
    /// Snapshot of all input lines. No buffering, no edge detection.
    fn read(&mut self) -> u32;
}

/// A port whose lines can be driven as one word.
pub trait DiscreteOutputPort {
    /// Drive every output line from `value` in a single write.
    fn write(&mut self, value: u32);
}

/// A bound GPIO channel. Lines can be switched between input and output.
pub trait GpioPort: DiscreteInputPort + DiscreteOutputPort {
    /// Configure line directions. A set bit makes that line an input.
    fn set_direction(&mut self, mask: u32);
}

/// Hands out [`GpioPort`]s for hardware device identifiers.
pub trait GpioController {
    type Port: GpioPort;

    fn initialize(&mut self, device_id: u16) -> Result<Self::Port, InitError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InitError {
    /// The hardware build has no GPIO instance with this identifier.
    #[error("no GPIO device with id {device_id}")]
    DeviceNotFound { device_id: u16 },

    /// The identifier is known but nothing answers at its address.
    #[error("GPIO device {device_id} is not present")]
    DeviceAbsent { device_id: u16 },

    /// A handle for this device has already been given out.
    #[error("GPIO device {device_id} is already bound")]
    AlreadyBound { device_id: u16 },
}

impl<T: DiscreteInputPort + ?Sized> DiscreteInputPort for &mut T {
    #[inline(always)]
    fn read(&mut self) -> u32 {
        (**self).read()
    }
}

impl<T: DiscreteOutputPort + ?Sized> DiscreteOutputPort for &mut T {
    #[inline(always)]
    fn write(&mut self, value: u32) {
        (**self).write(value)
    }
}
