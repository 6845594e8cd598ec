//! Periodic tick source for drivers without a steady external clock.
//!
//! The ticker is polled with the current time and reports how many periods
//! have elapsed since the last poll. `stop()` disarms it synchronously; a
//! stopped ticker never reports a due tick, so nothing can fire after stop.

pub const DEFAULT_TICK_PERIOD_MS: i64 = 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticker {
    period_ms: i64,
    next_due_ms: Option<i64>,
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_PERIOD_MS)
    }
}

impl Ticker {
    /// Non-positive periods fall back to one second.
    pub fn new(period_ms: i64) -> Self {
        Self {
            period_ms: if period_ms > 0 { period_ms } else { DEFAULT_TICK_PERIOD_MS },
            next_due_ms: None,
        }
    }

    pub fn period_ms(&self) -> i64 {
        self.period_ms
    }

    pub fn is_running(&self) -> bool {
        self.next_due_ms.is_some()
    }

    pub fn next_due_ms(&self) -> Option<i64> {
        self.next_due_ms
    }

    /// Arm the ticker; the first tick is due one period after `now_ms`.
    pub fn start(&mut self, now_ms: i64) {
        self.next_due_ms = Some(now_ms + self.period_ms);
    }

    pub fn stop(&mut self) {
        self.next_due_ms = None;
    }

    /// Number of ticks due at `now_ms`. Advances the deadline by whole
    /// periods, so irregular polling neither loses nor duplicates ticks.
    pub fn poll(&mut self, now_ms: i64) -> u32 {
        let Some(due) = self.next_due_ms else {
            return 0;
        };
        if now_ms < due {
            return 0;
        }
        let count = (now_ms - due) / self.period_ms + 1;
        self.next_due_ms = Some(due + count * self.period_ms);
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}
