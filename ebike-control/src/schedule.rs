//! Fixed-period task gating for the superloop.

/// Fires at most once per `period_ms`, wrapping-safe.
#[derive(Copy, Clone, Debug)]
pub struct Interval {
    period_ms: u32,
    last: Option<u32>,
}

impl Interval {
    pub const fn new(period_ms: u32) -> Self {
        Self {
            period_ms,
            last: None,
        }
    }

    #[inline]
    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// True on the first call and whenever `period_ms` has elapsed since the last firing.
    pub fn due(&mut self, now_ms: u32) -> bool {
        match self.last {
            Some(last) if now_ms.wrapping_sub(last) < self.period_ms => false,
            _ => {
                self.last = Some(now_ms);
                true
            }
        }
    }
}
