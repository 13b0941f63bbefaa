pub mod adc;
pub mod can;
pub mod clock;
pub mod logger;
pub mod pins;
pub mod usart;
pub mod watchdog;

pub use adc::{Adc, Throttle};
pub use can::CanBus;
pub use clock::SysTickClock;
pub use pins::BoardPins;
pub use usart::Usart;
pub use watchdog::IndependentWatchdog;
