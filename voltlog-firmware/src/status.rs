//! Sampler diagnostics counters

use portable_atomic::{AtomicU32, Ordering};

use voltlog_core::sampler::CycleReport;

static CYCLES: AtomicU32 = AtomicU32::new(0);
static LOGGED: AtomicU32 = AtomicU32::new(0);
static FAILED: AtomicU32 = AtomicU32::new(0);
static SHORT_WRITES: AtomicU32 = AtomicU32::new(0);
static CLEANUP_FAILURES: AtomicU32 = AtomicU32::new(0);

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, defmt::Format)]
pub struct StatusSnapshot {
    /// Cycles attempted since boot
    pub cycles: u32,
    /// Cycles that appended a record
    pub logged: u32,
    /// Cycles that ended early
    pub failed: u32,
    /// Appends the card accepted only in part
    pub short_writes: u32,
    /// Cycles where disable or close failed
    pub cleanup_failures: u32,
}

/// Count one finished cycle
pub fn record(report: &CycleReport) {
    CYCLES.fetch_add(1, Ordering::Relaxed);
    if report.is_success() {
        LOGGED.fetch_add(1, Ordering::Relaxed);
    } else {
        FAILED.fetch_add(1, Ordering::Relaxed);
    }
    if report.is_short_write() {
        SHORT_WRITES.fetch_add(1, Ordering::Relaxed);
    }
    if !report.cleanup.is_clean() {
        CLEANUP_FAILURES.fetch_add(1, Ordering::Relaxed);
    }
}

/// Read all counters
pub fn snapshot() -> StatusSnapshot {
    StatusSnapshot {
        cycles: CYCLES.load(Ordering::Relaxed),
        logged: LOGGED.load(Ordering::Relaxed),
        failed: FAILED.load(Ordering::Relaxed),
        short_writes: SHORT_WRITES.load(Ordering::Relaxed),
        cleanup_failures: CLEANUP_FAILURES.load(Ordering::Relaxed),
    }
}
