use core::panic::PanicInfo;

use mbviz::consts::LOOP_PERIOD_US;
use mbviz::Pacer;

#[panic_handler]
fn panic(_panic: &PanicInfo<'_>) -> ! {
    loop {}
}

// Provided by the board support package.
unsafe extern "C" {
    pub unsafe fn init_platform();

    pub unsafe fn cleanup_platform();

    pub unsafe fn usleep(useconds: u32) -> i32;
}

/// Tear the platform down and park the core.
pub fn halt() -> ! {
    unsafe { cleanup_platform() };
    loop {}
}

/// Paces the loop with the BSP's blocking sleep.
pub struct UsleepPacer;

impl Pacer for UsleepPacer {
    #[inline(always)]
    fn pace(&mut self) {
        unsafe { usleep(LOOP_PERIOD_US) };
    }
}
