//! Device table from the hardware build.
//!
//! Keep in sync with the block design. Instances that were given explicit
//! names in the design win over the generic `axi_gpio_N` numbering.

use mbviz::{DeviceIds, InitPolicy};

use crate::axi_gpio::{GpioConfig, MAX_DEVICES};

// Generic instance ids, always present in the export.
const AXI_GPIO_0_DEVICE_ID: u16 = 0; // switches
const AXI_GPIO_1_DEVICE_ID: u16 = 1; // volume from the audio looper
const AXI_GPIO_2_DEVICE_ID: u16 = 2; // bar height to the HDMI color mapper

// Named instances. `None` when the design doesn't name them.
const GPIO_STATUS_DEVICE_ID: Option<u16> = None;
const GPIO_VOLUME_DEVICE_ID: Option<u16> = None;
const GPIO_GFX_DEVICE_ID: Option<u16> = None;

const fn named_or(named: Option<u16>, generic: u16) -> u16 {
    match named {
        Some(id) => id,
        None => generic,
    }
}

pub const DEVICE_IDS: DeviceIds = DeviceIds {
    status: named_or(GPIO_STATUS_DEVICE_ID, AXI_GPIO_0_DEVICE_ID),
    volume: named_or(GPIO_VOLUME_DEVICE_ID, AXI_GPIO_1_DEVICE_ID),
    gfx: named_or(GPIO_GFX_DEVICE_ID, AXI_GPIO_2_DEVICE_ID),
};

const GPIO_DEVICE_COUNT: usize = 3;
const _: () = assert!(GPIO_DEVICE_COUNT <= MAX_DEVICES);

pub static GPIO_DEVICES: [GpioConfig; GPIO_DEVICE_COUNT] = [
    GpioConfig { device_id: AXI_GPIO_0_DEVICE_ID, base_address: 0x4000_0000 },
    GpioConfig { device_id: AXI_GPIO_1_DEVICE_ID, base_address: 0x4001_0000 },
    GpioConfig { device_id: AXI_GPIO_2_DEVICE_ID, base_address: 0x4002_0000 },
];

/// AXI UART Lite used for the diagnostic console.
pub const UARTLITE_BASE: usize = 0x4060_0000;

/// A port that doesn't come up means reads and writes would go nowhere
/// useful, so don't start the loop.
pub const INIT_POLICY: InitPolicy = InitPolicy::Strict;
