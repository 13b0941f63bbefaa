//! Independent watchdog (IWDG) using direct PAC register access.

use ebike_control::Watchdog;
use stm32f7xx_hal::pac;

const KEY_RELOAD: u32 = 0xAAAA;
const KEY_UNLOCK: u32 = 0x5555;
const KEY_START: u32 = 0xCCCC;

/// Prescaler /32 on the ~32 kHz LSI gives roughly a 1 ms watchdog tick.
const PRESCALER_DIV32: u32 = 0b011;
const MAX_RELOAD: u32 = 0x0FFF;

pub struct IndependentWatchdog {
    iwdg: pac::IWDG,
}

impl IndependentWatchdog {
    /// Start the watchdog with a timeout of about `timeout_ms` (at most ~4 s).
    ///
    /// Once started it cannot be stopped.
    pub fn start(iwdg: pac::IWDG, timeout_ms: u32) -> Self {
        iwdg.kr.write(|w| unsafe { w.bits(KEY_START) });
        iwdg.kr.write(|w| unsafe { w.bits(KEY_UNLOCK) });
        iwdg.pr.write(|w| unsafe { w.bits(PRESCALER_DIV32) });
        iwdg.rlr
            .write(|w| unsafe { w.bits(timeout_ms.clamp(1, MAX_RELOAD)) });

        // Wait for the prescaler and reload updates to land in the LSI domain
        while iwdg.sr.read().bits() != 0 {}

        iwdg.kr.write(|w| unsafe { w.bits(KEY_RELOAD) });
        Self { iwdg }
    }
}

impl Watchdog for IndependentWatchdog {
    #[inline]
    fn reset_timeout(&mut self) {
        self.iwdg.kr.write(|w| unsafe { w.bits(KEY_RELOAD) });
    }
}
