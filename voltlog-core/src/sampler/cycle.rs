//! One sample-and-persist cycle

use super::record::{FormatError, Measurement, WriteBuffer, WRITE_BUFFER_LEN};
use super::session::{CleanupReport, StorageSession};
use crate::traits::{BatteryMonitor, SensorError};
use voltlog_hal::storage::{Storage, StorageError, StorageSetup};

/// Interval between two samples in milliseconds
pub const SAMPLE_PERIOD_MS: u64 = 600_000;

/// Monotonic millisecond clock used to timestamp records
pub trait TickSource {
    /// Milliseconds elapsed since boot
    fn now_ms(&self) -> u64;
}

/// The step that ended a cycle early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleError {
    /// Storage could not be configured
    Configure(StorageError),
    /// Storage could not be enabled
    Enable(StorageError),
    /// Battery measurement failed
    SensorRead(SensorError),
    /// Record did not fit the write buffer
    Format(FormatError),
    /// Storage rejected the write
    Append(StorageError),
}

/// Everything that happened during one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    /// The sample, if the sensor produced one
    pub measurement: Option<Measurement>,
    /// Length of the rendered record
    pub requested: usize,
    /// Bytes the storage accepted
    pub written: usize,
    /// File offset after the cycle
    pub offset: u32,
    /// First failing step, if any
    pub failure: Option<CycleError>,
    /// Outcome of disable and close
    pub cleanup: CleanupReport,
}

impl CycleReport {
    /// Check if the record was appended
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Check if the storage accepted only part of the record
    pub fn is_short_write(&self) -> bool {
        self.is_success() && self.written < self.requested
    }
}

/// Periodic battery sampler
///
/// Owns the write buffer and the running file offset. The offset starts at
/// zero each boot.
pub struct Sampler<const N: usize = WRITE_BUFFER_LEN> {
    setup: StorageSetup,
    buffer: WriteBuffer<N>,
}

/// Primary path result, before cleanup
struct Progress {
    measurement: Option<Measurement>,
    requested: usize,
    written: usize,
}

impl<const N: usize> Sampler<N> {
    /// Create a sampler writing to the file described by `setup`
    pub fn new(setup: StorageSetup) -> Self {
        Self {
            setup,
            buffer: WriteBuffer::new(),
        }
    }

    /// File offset the next record will be written at
    pub fn offset(&self) -> u32 {
        self.buffer.offset()
    }

    /// Storage target of this sampler
    pub fn setup(&self) -> &StorageSetup {
        &self.setup
    }

    /// Run one cycle
    ///
    /// Never fails: every error is recorded in the returned report and the
    /// storage session is always finished.
    pub async fn run_cycle<S, M, T>(
        &mut self,
        storage: &mut S,
        sensor: &mut M,
        clock: &T,
    ) -> CycleReport
    where
        S: Storage,
        M: BatteryMonitor,
        T: TickSource,
    {
        let mut progress = Progress {
            measurement: None,
            requested: 0,
            written: 0,
        };

        let mut session = StorageSession::new(storage, self.setup.medium);
        let failure = self
            .sample_and_append(&mut session, sensor, clock, &mut progress)
            .await
            .err();
        let cleanup = session.finish().await;

        CycleReport {
            measurement: progress.measurement,
            requested: progress.requested,
            written: progress.written,
            offset: self.buffer.offset(),
            failure,
            cleanup,
        }
    }

    async fn sample_and_append<S, M, T>(
        &mut self,
        session: &mut StorageSession<'_, S>,
        sensor: &mut M,
        clock: &T,
        progress: &mut Progress,
    ) -> Result<(), CycleError>
    where
        S: Storage,
        M: BatteryMonitor,
        T: TickSource,
    {
        session
            .configure(&self.setup)
            .await
            .map_err(CycleError::Configure)?;
        session.enable().await.map_err(CycleError::Enable)?;

        let millivolts = sensor.measure_mv().await.map_err(CycleError::SensorRead)?;
        let measurement = Measurement {
            ticks: clock.now_ms(),
            millivolts,
        };
        progress.measurement = Some(measurement);

        progress.requested = self.buffer.render(&measurement).map_err(CycleError::Format)?;

        let written = session
            .append(self.buffer.offset(), self.buffer.as_bytes())
            .await
            .map_err(CycleError::Append)?;
        progress.written = written;
        self.buffer.advance(written);

        Ok(())
    }
}
