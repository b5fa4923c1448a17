//! Drift-free periodic wake schedule

/// Absolute wake instants on a fixed grid
///
/// Each wake is the previous wake plus the period, never the time the work
/// finished. A late cycle therefore shortens the next sleep instead of
/// shifting every later sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WakeSchedule {
    last_wake_ms: u64,
    period_ms: u64,
}

impl WakeSchedule {
    /// Start a schedule anchored at `start_ms`
    ///
    /// The first wake is one period after the anchor.
    pub const fn new(start_ms: u64, period_ms: u64) -> Self {
        Self {
            last_wake_ms: start_ms,
            period_ms,
        }
    }

    /// Advance to and return the next wake instant
    pub fn advance(&mut self) -> u64 {
        self.last_wake_ms = self.last_wake_ms.saturating_add(self.period_ms);
        self.last_wake_ms
    }

    /// Check if `now_ms` is already past the current wake instant
    pub const fn is_overdue(&self, now_ms: u64) -> bool {
        now_ms > self.last_wake_ms
    }
}
