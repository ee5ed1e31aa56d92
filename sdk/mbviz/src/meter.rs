//! The pure part of the loop: scaling, peak-hold and packing.

use bit_field::BitField;

use crate::consts::{BAR_MAX, DECAY_PERIOD, FIELD_BITS, SCALE_SHIFT};

/// Scale a raw volume word to a bar height and clip it to [`BAR_MAX`].
#[inline(always)]
pub const fn scale(volume_raw: u32) -> u32 {
    let bar = volume_raw >> SCALE_SHIFT;
    if bar > BAR_MAX { BAR_MAX } else { bar }
}

/// Pack peak and bar heights into the word the display hardware expects.
///
/// Peak goes in bits 31..16, bar in bits 15..0. Values wider than a field are
/// truncated to it rather than bleeding into the neighbour.
#[inline]
pub fn pack(peak_height: u32, bar_height: u32) -> u32 {
    debug_assert!(peak_height <= BAR_MAX && bar_height <= BAR_MAX);

    let mut word = 0u32;
    word.set_bits(0..FIELD_BITS, bar_height.get_bits(0..FIELD_BITS));
    word.set_bits(FIELD_BITS..32, peak_height.get_bits(0..FIELD_BITS));
    word
}

/// Split a packed word back into `(peak_height, bar_height)`.
#[inline]
pub fn unpack(word: u32) -> (u32, u32) {
    (word.get_bits(FIELD_BITS..32), word.get_bits(0..FIELD_BITS))
}

/// State that survives from one iteration to the next.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoopState {
    /// Slow-release maximum of recent bar heights.
    pub peak_height: u32,
    /// Iterations since the peak was last pushed up (or last decayed).
    pub gravity_counter: u32,
}

/// Everything one iteration produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub volume_raw: u32,
    pub bar_height: u32,
    pub peak_height: u32,
    pub packed: u32,
}

impl LoopState {
    pub const fn new() -> Self {
        Self { peak_height: 0, gravity_counter: 0 }
    }

    /// Start from an arbitrary peak, e.g. to replay a captured trace.
    ///
    /// The peak is clipped to [`BAR_MAX`] like any bar would be.
    pub const fn with_peak(peak_height: u32) -> Self {
        let peak_height = if peak_height > BAR_MAX { BAR_MAX } else { peak_height };
        Self { peak_height, gravity_counter: 0 }
    }

    /// Feed one clipped bar height through the peak-hold rule.
    ///
    /// Rising bars move the peak instantly. Otherwise the peak falls by one
    /// unit once the counter has gone past [`DECAY_PERIOD`], which makes the
    /// release linear: one unit every `DECAY_PERIOD + 1` quiet iterations.
    pub fn update(&mut self, bar_height: u32) {
        debug_assert!(bar_height <= BAR_MAX);

        if bar_height > self.peak_height {
            self.peak_height = bar_height;
            self.gravity_counter = 0;
            return;
        }

        self.gravity_counter += 1;
        if self.gravity_counter > DECAY_PERIOD {
            self.peak_height = self.peak_height.saturating_sub(1);
            self.gravity_counter = 0;
        }
    }

    /// Scale, update and pack in one go.
    pub fn step(&mut self, volume_raw: u32) -> Frame {
        let bar_height = scale(volume_raw);
        self.update(bar_height);

        Frame {
            volume_raw,
            bar_height,
            peak_height: self.peak_height,
            packed: pack(self.peak_height, bar_height),
        }
    }
}
