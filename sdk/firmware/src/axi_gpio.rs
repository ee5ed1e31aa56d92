use mbviz::{DiscreteInputPort, DiscreteOutputPort, GpioController, GpioPort, InitError};
use volatile_register::RW;

/// AXI GPIO register block. Only channel 1 is used.
#[repr(C)]
pub struct AxiGpioRegisters {
    pub data: RW<u32>,  // channel 1 data
    pub tri: RW<u32>,   // channel 1 direction, 1 = input
    pub data2: RW<u32>, // channel 2 data
    pub tri2: RW<u32>,  // channel 2 direction
}

#[derive(Debug, Clone, Copy)]
pub struct GpioConfig {
    pub device_id: u16,
    pub base_address: usize,
}

/// Channel 1 of one AXI GPIO instance.
pub struct AxiGpio {
    regs: &'static mut AxiGpioRegisters,
}

impl AxiGpio {
    /// # Safety
    /// `base_address` must point at an AXI GPIO block, and no other handle
    /// to it may exist.
    pub unsafe fn new(base_address: usize) -> AxiGpio {
        AxiGpio { regs: unsafe { &mut *(base_address as *mut AxiGpioRegisters) } }
    }
}

impl DiscreteInputPort for AxiGpio {
    #[inline(always)]
    fn read(&mut self) -> u32 {
        self.regs.data.read()
    }
}

impl DiscreteOutputPort for AxiGpio {
    #[inline(always)]
    fn write(&mut self, value: u32) {
        unsafe { self.regs.data.write(value) };
    }
}

impl GpioPort for AxiGpio {
    fn set_direction(&mut self, mask: u32) {
        unsafe { self.regs.tri.write(mask) };
    }
}

/// Table entries an [`AxiGpioController`] can track.
pub const MAX_DEVICES: usize = u32::BITS as usize;

/// Looks device ids up in the hardware build's table and hands each one out once.
pub struct AxiGpioController {
    table: &'static [GpioConfig],
    /// Bit `n` set once `table[n]` has been handed out.
    bound: u32,
}

impl AxiGpioController {
    /// Panics if `table` has more than [`MAX_DEVICES`] entries.
    pub const fn new(table: &'static [GpioConfig]) -> Self {
        assert!(table.len() <= MAX_DEVICES, "too many AXI GPIO instances");
        Self { table, bound: 0 }
    }
}

impl GpioController for AxiGpioController {
    type Port = AxiGpio;

    fn initialize(&mut self, device_id: u16) -> Result<AxiGpio, InitError> {
        let (slot, config) = self
            .table
            .iter()
            .enumerate()
            .find(|(_, config)| config.device_id == device_id)
            .ok_or(InitError::DeviceNotFound { device_id })?;

        // A zero base means the instance was left out of this build.
        if config.base_address == 0 {
            return Err(InitError::DeviceAbsent { device_id });
        }

        let bit = 1u32 << slot;
        if self.bound & bit != 0 {
            return Err(InitError::AlreadyBound { device_id });
        }
        self.bound |= bit;

        Ok(unsafe { AxiGpio::new(config.base_address) })
    }
}
