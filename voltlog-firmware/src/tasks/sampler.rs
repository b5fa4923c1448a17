//! Periodic battery sampler task
//!
//! Wakes every [`SAMPLE_PERIOD_MS`] on a fixed grid, measures the battery
//! and appends one record to the log file. Failures are logged and the loop
//! carries on with the next period.

use defmt::*;
use embassy_time::{Instant, Timer};

use voltlog_core::sampler::{CycleError, CycleReport, Sampler, TickSource, WakeSchedule, SAMPLE_PERIOD_MS};
use voltlog_hal::storage::StorageSetup;

use crate::boot::{BoardSensor, BoardStorage};
use crate::status;

/// Milliseconds since boot from the Embassy time driver
struct Uptime;

impl TickSource for Uptime {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}

/// Sampler task - one instance, spawned by the last bootstrap stage
#[embassy_executor::task(pool_size = 1)]
pub async fn sampler_task(
    mut sensor: BoardSensor,
    mut storage: BoardStorage,
    setup: StorageSetup,
) {
    let mut sampler: Sampler = Sampler::new(setup);
    info!(
        "Sampler task started, logging to {}",
        sampler.setup().file_name.as_str()
    );
    let mut schedule = WakeSchedule::new(Uptime.now_ms(), SAMPLE_PERIOD_MS);

    loop {
        let wake = schedule.advance();
        if schedule.is_overdue(Uptime.now_ms()) {
            warn!("Sampler running late for wake at {} ms", wake);
        }
        Timer::at(Instant::from_millis(wake)).await;

        let report = sampler.run_cycle(&mut storage, &mut sensor, &Uptime).await;
        status::record(&report);
        log_report(&report);
        debug!("Sampler status: {}", status::snapshot());
    }
}

fn log_report(report: &CycleReport) {
    match (report.failure, report.measurement) {
        (None, Some(m)) if report.is_short_write() => warn!(
            "Short write: {} of {} bytes for {} mV, offset now {}",
            report.written, report.requested, m.millivolts, report.offset
        ),
        (None, Some(m)) => info!(
            "Logged {} mV at {} ms, offset now {}",
            m.millivolts, m.ticks, report.offset
        ),
        (None, None) => {}
        (Some(CycleError::Configure(e)), _) => error!("Failed to set up storage: {}", e),
        (Some(CycleError::Enable(e)), _) => error!("Failed to enable storage: {}", e),
        (Some(CycleError::SensorRead(e)), _) => error!("Failed to read battery voltage: {}", e),
        (Some(CycleError::Format(e)), _) => error!("Failed to format record: {}", e),
        (Some(CycleError::Append(e)), _) => error!("Failed to write record to SD card: {}", e),
    }

    if let Some(Err(e)) = report.cleanup.disable {
        error!("Failed to disable SD card storage: {}", e);
    }
    if let Err(e) = report.cleanup.close {
        error!("Failed to close storage: {}", e);
    }
}
