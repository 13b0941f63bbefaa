//! Controller Area Network (CAN) abstraction layer.
//!
//! - `CanBus` wraps a HAL `can::Can` instance in `bxcan::Can`.
//! - Transmit and receive never block: the superloop polls them every iteration.

use bxcan::{self, filter::Mask32, Fifo, Frame, OverrunError};
use can_dict::Transmit;
use log::debug;
use stm32f7xx_hal::can as hal_can;

/// Nominal bit timing for 500 kbit/s from a 16 MHz APB1 clock: BRP 2, BS1 13, BS2 2, SJW 1.
pub const BTR_500K_16MHZ: u32 = 0x001C_0001;

/// Transmit failure.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TxError {
    /// All mailboxes hold frames of equal or higher priority.
    MailboxesFull,
}

/// Wrapper around a bxcan CAN instance built from a HAL CAN peripheral.
pub struct CanBus<I>
where
    hal_can::Can<I>: bxcan::Instance,
{
    can: bxcan::Can<hal_can::Can<I>>,
}

impl<I> CanBus<I>
where
    hal_can::Can<I>: bxcan::Instance,
{
    /// Create and enable a bxcan instance from a HAL CAN peripheral.
    ///
    /// * `hal_can` – the HAL CAN wrapper
    /// * `btr` – value for the CAN_BTR register (bit timing), e.g. [`BTR_500K_16MHZ`]
    /// * `loopback` – enable internal loopback
    /// * `silent` – enable silent mode
    pub fn new(hal_can: hal_can::Can<I>, btr: u32, loopback: bool, silent: bool) -> Self {
        let can = bxcan::Can::builder(hal_can)
            .set_bit_timing(btr)
            .set_loopback(loopback)
            .set_silent(silent)
            .enable();

        Self { can }
    }

    /// Queue `frame` without waiting.
    ///
    /// If a lower-priority frame had to be evicted from a mailbox to make room it is dropped.
    pub fn try_transmit(&mut self, frame: &Frame) -> Result<(), TxError> {
        match self.can.transmit(frame) {
            Ok(status) => {
                if let Some(evicted) = status.dequeued_frame() {
                    debug!("can: evicted pending frame {:?}", evicted.id());
                }
                Ok(())
            }
            Err(nb::Error::WouldBlock) => Err(TxError::MailboxesFull),
            Err(nb::Error::Other(never)) => match never {},
        }
    }

    /// Take the next received frame, if any.
    pub fn try_receive(&mut self) -> Option<Result<Frame, OverrunError>> {
        match self.can.receive() {
            Ok(frame) => Some(Ok(frame)),
            Err(nb::Error::WouldBlock) => None,
            Err(nb::Error::Other(overrun)) => Some(Err(overrun)),
        }
    }
}

impl<I> Transmit for CanBus<I>
where
    hal_can::Can<I>: bxcan::Instance,
{
    type Error = TxError;

    fn transmit(&mut self, frame: &Frame) -> Result<(), TxError> {
        self.try_transmit(frame)
    }
}

/// Filter setup for the instance that owns the filter banks (CAN1 on STM32F7).
impl<I> CanBus<I>
where
    hal_can::Can<I>: bxcan::Instance + bxcan::FilterOwner,
{
    /// Accept every frame into FIFO0.
    pub fn accept_all(&mut self) {
        self.can
            .modify_filters()
            .enable_bank(0, Fifo::Fifo0, Mask32::accept_all());
    }
}
