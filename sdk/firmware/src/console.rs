//! Diagnostic console on the AXI UART Lite, plus a `log` backend on top of it.

use core::fmt::{self, Write};

use log::{LevelFilter, Log, Metadata, Record};
use volatile_register::{RO, WO};

use crate::params::UARTLITE_BASE;

#[repr(C)]
pub struct UartLiteRegisters {
    pub rx_fifo: RO<u32>,
    pub tx_fifo: WO<u32>,
    pub stat: RO<u32>,
    pub ctrl: WO<u32>,
}

bitflags::bitflags! {
    /// Status register, read-only.
    #[derive(Copy, Clone, Debug)]
    pub struct StatusFlags: u32 {
        const RX_FIFO_VALID_DATA = 0b0000_0001;
        const RX_FIFO_FULL       = 0b0000_0010;
        const TX_FIFO_EMPTY      = 0b0000_0100;
        const TX_FIFO_FULL       = 0b0000_1000;
        const INTR_ENABLED       = 0b0001_0000;
        const OVERRUN_ERROR      = 0b0010_0000;
        const FRAME_ERROR        = 0b0100_0000;
        const PARITY_ERROR       = 0b1000_0000;
    }

    /// Control register, write-only.
    #[derive(Copy, Clone, Debug)]
    pub struct ControlFlags: u32 {
        const RST_TX_FIFO = 0b0000_0001;
        const RST_RX_FIFO = 0b0000_0010;
        const ENABLE_INTR = 0b0001_0000;
    }
}

pub struct UartLite {
    regs: &'static UartLiteRegisters,
}

impl UartLite {
    /// # Safety
    /// `base_address` must point at a UART Lite block.
    pub unsafe fn new(base_address: usize) -> UartLite {
        UartLite { regs: unsafe { &*(base_address as *const UartLiteRegisters) } }
    }

    pub fn status(&self) -> StatusFlags {
        StatusFlags::from_bits_truncate(self.regs.stat.read())
    }

    /// Flush both FIFOs and leave interrupts off; we only ever poll.
    pub fn reset(&self) {
        let ctrl = ControlFlags::RST_TX_FIFO | ControlFlags::RST_RX_FIFO;
        unsafe { self.regs.ctrl.write(ctrl.bits()) };
    }

    #[inline]
    pub fn write_byte(&self, byte: u8) {
        while self.status().contains(StatusFlags::TX_FIFO_FULL) {}
        unsafe { self.regs.tx_fifo.write(byte as u32) };
    }
}

impl Write for UartLite {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            // terminals on the other end expect CR after LF
            self.write_byte(byte);
            if byte == b'\n' {
                self.write_byte(b'\r');
            }
        }
        Ok(())
    }
}

fn console() -> UartLite {
    unsafe { UartLite::new(UARTLITE_BASE) }
}

struct ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let _ = writeln!(console(), "{}", record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

/// Reset the UART and route `log` output to it.
///
/// Call once, before anything logs. The softcore has no atomics, so this uses
/// the racy setters; there is only one thread.
pub fn init(level: LevelFilter) {
    console().reset();
    unsafe {
        let _ = log::set_logger_racy(&LOGGER);
        log::set_max_level_racy(level);
    }
}
