//! `log` backend writing to the debug terminal.
//!
//! The console USART is parked in a critical-section mutex so both the logger and the terminal
//! command handler can reach it.

use core::cell::RefCell;
use core::fmt::Write;

use cortex_m::interrupt::{self, Mutex};
use log::{LevelFilter, Log, Metadata, Record};
use stm32f7xx_hal::pac::USART3;

use super::usart::Usart;

pub type Console = Usart<USART3>;

static CONSOLE: Mutex<RefCell<Option<Console>>> = Mutex::new(RefCell::new(None));
static LOGGER: UsartLogger = UsartLogger;

struct UsartLogger;

impl Log for UsartLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        interrupt::free(|cs| {
            // Busy means the terminal holds the console; drop the line.
            if let Ok(mut console) = CONSOLE.borrow(cs).try_borrow_mut() {
                if let Some(console) = console.as_mut() {
                    let _ = write!(console, "[{}] {}\r\n", record.level(), record.args());
                }
            }
        });
    }

    fn flush(&self) {}
}

/// Hand `console` to the logger and install it.
pub fn init(console: Console, level: LevelFilter) {
    interrupt::free(|cs| {
        CONSOLE.borrow(cs).replace(Some(console));
    });
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

/// Run `f` with exclusive access to the console. `None` before [`init`] or while it is in use.
pub fn with_console<R>(f: impl FnOnce(&mut Console) -> R) -> Option<R> {
    interrupt::free(|cs| {
        let mut console = CONSOLE.borrow(cs).try_borrow_mut().ok()?;
        console.as_mut().map(f)
    })
}
