//! Compile-time tunables. Nothing here can be changed at runtime.

/// Right shift applied to the raw volume word (divide by 8).
///
/// The volume hardware reports roughly 0..=32768; the shift is a cheap
/// stand-in for the real scale factor and deliberately overshoots the
/// drawable area, so loud passages pin the bar at [`BAR_MAX`].
pub const SCALE_SHIFT: u32 = 3;

/// Tallest bar the display can draw without covering the overlay graphics.
pub const BAR_MAX: u32 = 400;

/// Non-rising iterations tolerated before the peak drops one unit.
pub const DECAY_PERIOD: u32 = 500;

/// Loop pacing, in microseconds. 5 ms gives a nominal 200 Hz update rate.
pub const LOOP_PERIOD_US: u32 = 5_000;

/// Width of each field in the packed output word.
pub const FIELD_BITS: usize = 16;

/// Direction mask with every line configured as an input.
pub const ALL_INPUTS: u32 = 0xFFFF_FFFF;
/// Direction mask with every line configured as an output.
pub const ALL_OUTPUTS: u32 = 0x0000_0000;

const _: () = assert!(BAR_MAX < (1 << FIELD_BITS), "BAR_MAX must fit a packed field");
