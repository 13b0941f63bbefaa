//! Periodic publisher: autonomous transmission of variables with a send interval.
//!
//! Every tick the publisher walks the active slots and, for each one whose interval has elapsed
//! since its last read, reads it through the normal read path and transmits
//! `[var_id, value...]` as a [`DICT_VALUE`](crate::frame::DICT_VALUE) frame. Reading stamps the
//! slot, so a remote read also postpones the next autonomous publish.
//!
//! The board's scheduler either calls [`Publisher::poll`] from its main loop or dedicates a task
//! to [`Publisher::run`].

use core::fmt::Debug;

use bxcan::Frame;
use log::{trace, warn};

use crate::clock::Clock;
use crate::dictionary::Dictionary;
use crate::frame::{packet_frame, DICT_VALUE};

/// Default scan period.
pub const DEFAULT_TICK_MS: u32 = 10;

/// Value bytes that fit in a publish frame after the ID byte.
pub const PUBLISH_WINDOW: usize = 7;

/// Outbound transport primitive. Must not block.
pub trait Transmit {
    type Error: Debug;

    fn transmit(&mut self, frame: &Frame) -> Result<(), Self::Error>;
}

impl<T: Transmit + ?Sized> Transmit for &mut T {
    type Error = T::Error;

    fn transmit(&mut self, frame: &Frame) -> Result<(), Self::Error> {
        (**self).transmit(frame)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PublisherConfig {
    /// Scan period in milliseconds.
    pub tick_ms: u32,
    /// This node's bus address, the low byte of every published frame ID.
    pub node_id: u8,
    /// Packet class of published frames.
    pub message_class: u8,
}

impl PublisherConfig {
    pub const fn new(node_id: u8) -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            node_id,
            message_class: DICT_VALUE,
        }
    }

    pub const fn with_tick_ms(mut self, tick_ms: u32) -> Self {
        self.tick_ms = tick_ms;
        self
    }
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self::new(0)
    }
}

pub struct Publisher {
    config: PublisherConfig,
    last_scan: Option<u32>,
    frames_sent: u32,
}

impl Publisher {
    pub const fn new(config: PublisherConfig) -> Self {
        Self {
            config,
            last_scan: None,
            frames_sent: 0,
        }
    }

    #[inline]
    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    /// Frames handed to the transport without error since start-up (wrapping).
    #[inline]
    pub fn frames_sent(&self) -> u32 {
        self.frames_sent
    }

    /// Scan if at least one tick has elapsed since the previous scan. Returns the number of frames
    /// sent.
    pub fn poll<C, T, const N: usize>(&mut self, dict: &Dictionary<'_, C, N>, tx: &mut T) -> usize
    where
        C: Clock,
        T: Transmit,
    {
        let now = dict.now_ms();
        if let Some(last) = self.last_scan {
            if now.wrapping_sub(last) < self.config.tick_ms {
                return 0;
            }
        }
        self.scan(dict, tx)
    }

    /// Scan every active slot now.
    pub fn scan<C, T, const N: usize>(&mut self, dict: &Dictionary<'_, C, N>, tx: &mut T) -> usize
    where
        C: Clock,
        T: Transmit,
    {
        let now = dict.now_ms();
        self.last_scan = Some(now);

        let mut sent = 0;
        for id in dict.active_ids() {
            let due = dict
                .active_slot(id)
                .map(|slot| slot.publish_due(now))
                .unwrap_or(false);
            if !due {
                continue;
            }

            let mut buf = [0u8; 1 + PUBLISH_WINDOW];
            buf[0] = id.raw();
            let len = dict.handle_read_request(id.raw(), &mut buf[1..]);
            if len == 0 {
                continue;
            }

            let frame =
                packet_frame(self.config.message_class, self.config.node_id, &buf[..1 + len]);
            match tx.transmit(&frame) {
                Ok(()) => {
                    trace!("can-dict: published {} ({} bytes)", id, len);
                    sent += 1;
                }
                Err(e) => warn!("can-dict: publish {} failed: {:?}", id, e),
            }
        }

        self.frames_sent = self.frames_sent.wrapping_add(sent as u32);
        sent
    }

    /// Scheduling loop for a dedicated task: scan, then sleep one tick, forever.
    ///
    /// `sleep_ms` is the task's delay primitive.
    pub fn run<C, T, D, const N: usize>(
        &mut self,
        dict: &Dictionary<'_, C, N>,
        tx: &mut T,
        mut sleep_ms: D,
    ) -> !
    where
        C: Clock,
        T: Transmit,
        D: FnMut(u32),
    {
        loop {
            self.scan(dict, tx);
            sleep_ms(self.config.tick_ms);
        }
    }
}
