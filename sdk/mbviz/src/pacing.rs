use core::time::Duration;

use crate::consts::LOOP_PERIOD_US;

/// Nominal time between two loop iterations.
pub const LOOP_PERIOD: Duration = Duration::from_micros(LOOP_PERIOD_US as u64);

/// The loop's only suspension point.
///
/// `pace` is called once after every iteration and should block for
/// [`LOOP_PERIOD`]. Tests use a pacer that returns immediately, which lets
/// them drive iterations synchronously.
pub trait Pacer {
    fn pace(&mut self);
}

impl<T: Pacer + ?Sized> Pacer for &mut T {
    fn pace(&mut self) {
        (**self).pace()
    }
}
