//! Millisecond time base on SysTick.
//!
//! The binary must forward the `SysTick` exception to [`tick`].

use core::sync::atomic::{AtomicU32, Ordering};

use can_dict::Clock;
use cortex_m::peripheral::{syst::SystClkSource, SYST};

static MILLIS: AtomicU32 = AtomicU32::new(0);

/// Advance the millisecond counter. Call from the `SysTick` handler only.
#[inline]
pub fn tick() {
    MILLIS.fetch_add(1, Ordering::Relaxed);
}

/// Wrapping millisecond clock driven by SysTick.
#[derive(Copy, Clone, Debug)]
pub struct SysTickClock;

impl SysTickClock {
    /// Configure SysTick to interrupt once per millisecond from the core clock.
    pub fn start(mut syst: SYST, sysclk_hz: u32) -> Self {
        syst.set_clock_source(SystClkSource::Core);
        syst.set_reload(sysclk_hz / 1_000 - 1);
        syst.clear_current();
        syst.enable_counter();
        syst.enable_interrupt();
        Self
    }
}

impl Clock for SysTickClock {
    #[inline]
    fn now_ms(&self) -> u32 {
        MILLIS.load(Ordering::Relaxed)
    }
}
