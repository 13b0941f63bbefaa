//! Per-ID slot metadata.

use core::sync::atomic::{AtomicU32, Ordering};

use heapless::Vec;

use crate::hooks::{raw_getter, raw_setter, Getter, Setter, WriteCallback};
use crate::variable::Variable;

/// Maximum number of write callbacks per slot.
pub const MAX_WRITE_CALLBACKS: usize = 4;

/// What a remote bus peer may do with a variable. Local code always has full access.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Access {
    pub readable: bool,
    pub writable: bool,
}

impl Access {
    pub const NONE: Access = Access::new(false, false);
    pub const READ_ONLY: Access = Access::new(true, false);
    pub const WRITE_ONLY: Access = Access::new(false, true);
    pub const READ_WRITE: Access = Access::new(true, true);

    pub const fn new(readable: bool, writable: bool) -> Self {
        Self { readable, writable }
    }
}

/// Autonomous publishing period.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SendInterval {
    /// Only sent in response to a remote read.
    #[default]
    Never,
    /// Published by the periodic publisher every `n` milliseconds.
    Every(u32),
}

impl SendInterval {
    /// `0` means never.
    pub const fn from_ms(ms: u32) -> Self {
        if ms == 0 {
            SendInterval::Never
        } else {
            SendInterval::Every(ms)
        }
    }

    /// Period in milliseconds, `None` for [`SendInterval::Never`].
    pub const fn period_ms(self) -> Option<u32> {
        match self {
            SendInterval::Never | SendInterval::Every(0) => None,
            SendInterval::Every(ms) => Some(ms),
        }
    }
}

/// Where a slot's bytes live.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Storage<'m> {
    /// Caller-owned cell.
    Bound(&'m Variable),
    /// Index into the dictionary's owned pool.
    Owned(usize),
}

pub(crate) struct Slot<'m> {
    /// `None` while the ID is unregistered.
    pub storage: Option<Storage<'m>>,
    pub length: u8,
    pub access: Access,
    pub setter: Setter,
    pub getter: Getter,
    pub send_interval: SendInterval,
    last_sent_at: AtomicU32,
    pub callbacks: Vec<WriteCallback, MAX_WRITE_CALLBACKS>,
}

impl<'m> Slot<'m> {
    pub fn empty() -> Self {
        Self {
            storage: None,
            length: 0,
            access: Access::NONE,
            setter: raw_setter,
            getter: raw_getter,
            send_interval: SendInterval::Never,
            last_sent_at: AtomicU32::new(0),
            callbacks: Vec::new(),
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.storage.is_some()
    }

    #[inline]
    pub fn last_sent_at(&self) -> u32 {
        self.last_sent_at.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn mark_sent(&self, now_ms: u32) {
        self.last_sent_at.store(now_ms, Ordering::Relaxed);
    }

    /// Whether an autonomous publish is due at `now_ms`. Wrapping arithmetic, so the ~49 day
    /// rollover of the millisecond counter does not stall publishing.
    pub fn publish_due(&self, now_ms: u32) -> bool {
        match self.send_interval.period_ms() {
            Some(period) => now_ms.wrapping_sub(self.last_sent_at()) >= period,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_interval_is_never() {
        assert_eq!(SendInterval::from_ms(0), SendInterval::Never);
        assert_eq!(SendInterval::from_ms(100).period_ms(), Some(100));
        assert_eq!(SendInterval::Every(0).period_ms(), None);
    }

    #[test]
    fn publish_due_survives_counter_wrap() {
        let mut slot = Slot::empty();
        slot.send_interval = SendInterval::Every(100);
        slot.mark_sent(u32::MAX - 49);

        assert!(!slot.publish_due(u32::MAX));
        assert!(!slot.publish_due(49));
        assert!(slot.publish_due(50));
    }
}
