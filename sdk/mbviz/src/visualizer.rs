use log::trace;

use crate::meter::{Frame, LoopState};
use crate::pacing::Pacer;
use crate::ports::{DiscreteInputPort, DiscreteOutputPort};

/// The sample → scale → decay → emit loop.
///
/// Owns the volume input, the graphics output and the peak-hold state. The
/// status port is not part of it; the loop never looks at switches.
pub struct Visualizer<I, O> {
    volume: I,
    gfx: O,
    state: LoopState,
}

impl<I: DiscreteInputPort, O: DiscreteOutputPort> Visualizer<I, O> {
    pub fn new(volume: I, gfx: O) -> Self {
        Self::with_state(volume, gfx, LoopState::new())
    }

    pub fn with_state(volume: I, gfx: O, state: LoopState) -> Self {
        Self { volume, gfx, state }
    }

    #[inline]
    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn volume(&self) -> &I {
        &self.volume
    }

    pub fn gfx(&self) -> &O {
        &self.gfx
    }

    /// One iteration. The read always completes before the write.
    pub fn tick(&mut self) -> Frame {
        let volume_raw = self.volume.read();
        let frame = self.state.step(volume_raw);
        self.gfx.write(frame.packed);

        trace!(
            "raw={} bar={} peak={} gravity={}",
            frame.volume_raw, frame.bar_height, frame.peak_height, self.state.gravity_counter
        );
        frame
    }

    /// Run forever. This is the whole program on the board.
    pub fn run<P: Pacer>(&mut self, pacer: &mut P) -> ! {
        loop {
            self.tick();
            pacer.pace();
        }
    }

    /// Run a fixed number of paced iterations and return the last frame.
    pub fn run_for<P: Pacer>(&mut self, pacer: &mut P, ticks: u32) -> Option<Frame> {
        let mut last = None;
        for _ in 0..ticks {
            last = Some(self.tick());
            pacer.pace();
        }
        last
    }

    pub fn into_parts(self) -> (I, O, LoopState) {
        (self.volume, self.gfx, self.state)
    }
}
