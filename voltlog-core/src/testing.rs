//! Host-side fakes shared by the unit tests

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::vec::Vec;

use voltlog_hal::storage::{Storage, StorageError, StorageMedium, StorageSetup};

use crate::boot::{BootPlatform, Dispatch, EnqueueError, SpawnError, Stage};
use crate::sampler::TickSource;
use crate::traits::{BatteryMonitor, SensorError};

/// FIFO dispatcher drained by hand in tests
pub struct QueueDispatcher {
    queue: RefCell<VecDeque<Stage>>,
    history: RefCell<Vec<Stage>>,
    refused: Option<Stage>,
}

impl QueueDispatcher {
    pub fn new() -> Self {
        Self {
            queue: RefCell::new(VecDeque::new()),
            history: RefCell::new(Vec::new()),
            refused: None,
        }
    }

    /// A dispatcher whose queue is full whenever `stage` is submitted
    pub fn refusing(stage: Stage) -> Self {
        Self {
            refused: Some(stage),
            ..Self::new()
        }
    }

    pub fn pop(&self) -> Option<Stage> {
        self.queue.borrow_mut().pop_front()
    }

    /// Every stage accepted so far
    pub fn history(&self) -> Vec<Stage> {
        self.history.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

impl Dispatch for QueueDispatcher {
    fn enqueue(&self, stage: Stage) -> Result<(), EnqueueError> {
        if self.refused == Some(stage) {
            return Err(EnqueueError::QueueFull);
        }
        self.queue.borrow_mut().push_back(stage);
        self.history.borrow_mut().push(stage);
        Ok(())
    }
}

/// Board with scripted outcomes and call counters
pub struct FakePlatform {
    pub sensor_result: Result<(), SensorError>,
    pub spawn_result: Result<(), SpawnError>,
    pub delays: u32,
    pub sensor_inits: u32,
    pub spawns: u32,
}

impl FakePlatform {
    pub fn healthy() -> Self {
        Self {
            sensor_result: Ok(()),
            spawn_result: Ok(()),
            delays: 0,
            sensor_inits: 0,
            spawns: 0,
        }
    }
}

impl BootPlatform for FakePlatform {
    async fn startup_delay(&mut self) {
        self.delays += 1;
    }

    async fn setup_sensor(&mut self) -> Result<(), SensorError> {
        self.sensor_inits += 1;
        self.sensor_result
    }

    fn spawn_sampler(&mut self) -> Result<(), SpawnError> {
        self.spawns += 1;
        self.spawn_result
    }
}

/// Storage operation kinds, used for failure injection and counting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Configure,
    Enable,
    Append,
    Read,
    Disable,
    Close,
}

/// One recorded storage call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Configure,
    Enable,
    Append { offset: u32, len: usize },
    Read { offset: u32 },
    Disable,
    Close,
}

impl Call {
    fn step(&self) -> Step {
        match self {
            Call::Configure => Step::Configure,
            Call::Enable => Step::Enable,
            Call::Append { .. } => Step::Append,
            Call::Read { .. } => Step::Read,
            Call::Disable => Step::Disable,
            Call::Close => Step::Close,
        }
    }
}

/// In-memory storage that records every call
///
/// The file survives across sessions, like a card left in the slot.
pub struct RecordingStorage {
    pub calls: Vec<Call>,
    pub file: Vec<u8>,
    /// Accept at most this many bytes per append
    pub accept_limit: Option<usize>,
    failing: Vec<Step>,
    configured: bool,
    enabled: bool,
}

impl RecordingStorage {
    pub fn new() -> Self {
        Self::failing(&[])
    }

    /// Storage on which every listed step fails
    pub fn failing(steps: &[Step]) -> Self {
        Self {
            calls: Vec::new(),
            file: Vec::new(),
            accept_limit: None,
            failing: steps.to_vec(),
            configured: false,
            enabled: false,
        }
    }

    pub fn clear_failures(&mut self) {
        self.failing.clear();
    }

    /// Number of calls of the given kind
    pub fn count(&self, step: Step) -> usize {
        self.calls.iter().filter(|c| c.step() == step).count()
    }

    /// Check that the last disable came before the last close
    pub fn disable_precedes_close(&self) -> bool {
        let last = |step| self.calls.iter().rposition(|c| c.step() == step);
        match (last(Step::Disable), last(Step::Close)) {
            (Some(d), Some(c)) => d < c,
            _ => false,
        }
    }

    fn check(&self, step: Step, error: StorageError) -> Result<(), StorageError> {
        if self.failing.contains(&step) {
            Err(error)
        } else {
            Ok(())
        }
    }
}

impl Storage for RecordingStorage {
    async fn configure(&mut self, setup: &StorageSetup) -> Result<(), StorageError> {
        self.calls.push(Call::Configure);
        self.check(Step::Configure, StorageError::NoCard)?;
        if setup.medium != StorageMedium::SdCard {
            return Err(StorageError::UnsupportedMedium);
        }
        self.configured = true;
        Ok(())
    }

    async fn enable(&mut self) -> Result<(), StorageError> {
        self.calls.push(Call::Enable);
        if !self.configured {
            return Err(StorageError::NotConfigured);
        }
        self.check(Step::Enable, StorageError::Filesystem)?;
        self.enabled = true;
        Ok(())
    }

    async fn append(
        &mut self,
        _medium: StorageMedium,
        offset: u32,
        data: &[u8],
    ) -> Result<usize, StorageError> {
        self.calls.push(Call::Append {
            offset,
            len: data.len(),
        });
        if !self.enabled {
            return Err(StorageError::NotEnabled);
        }
        self.check(Step::Append, StorageError::Io)?;

        let offset = offset as usize;
        if offset > self.file.len() {
            return Err(StorageError::InvalidOffset);
        }
        let accepted = self.accept_limit.map_or(data.len(), |l| l.min(data.len()));
        // Overwrite in place and keep any tail, as a FAT file does
        let end = offset + accepted;
        if end > self.file.len() {
            self.file.resize(end, 0);
        }
        self.file[offset..end].copy_from_slice(&data[..accepted]);
        Ok(accepted)
    }

    async fn read(
        &mut self,
        _medium: StorageMedium,
        offset: u32,
        buffer: &mut [u8],
    ) -> Result<usize, StorageError> {
        self.calls.push(Call::Read { offset });
        if !self.enabled {
            return Err(StorageError::NotEnabled);
        }
        self.check(Step::Read, StorageError::Io)?;

        let start = (offset as usize).min(self.file.len());
        let n = (self.file.len() - start).min(buffer.len());
        buffer[..n].copy_from_slice(&self.file[start..start + n]);
        Ok(n)
    }

    async fn disable(&mut self, _medium: StorageMedium) -> Result<(), StorageError> {
        self.calls.push(Call::Disable);
        self.enabled = false;
        self.check(Step::Disable, StorageError::Io)
    }

    async fn close(&mut self) -> Result<(), StorageError> {
        self.calls.push(Call::Close);
        self.enabled = false;
        self.configured = false;
        self.check(Step::Close, StorageError::Io)
    }
}

/// Sensor returning queued readings, then a steady value
pub struct ScriptedSensor {
    script: VecDeque<Result<u32, SensorError>>,
    steady: u32,
    pub reads: u32,
}

impl ScriptedSensor {
    pub fn steady(millivolts: u32) -> Self {
        Self {
            script: VecDeque::new(),
            steady: millivolts,
            reads: 0,
        }
    }

    /// Queue a reading ahead of the steady value
    pub fn then(mut self, reading: Result<u32, SensorError>) -> Self {
        self.script.push_back(reading);
        self
    }
}

impl BatteryMonitor for ScriptedSensor {
    async fn init(&mut self) -> Result<(), SensorError> {
        Ok(())
    }

    async fn measure_mv(&mut self) -> Result<u32, SensorError> {
        self.reads += 1;
        self.script.pop_front().unwrap_or(Ok(self.steady))
    }
}

/// Clock stopped at one instant
pub struct FixedClock(pub u64);

impl TickSource for FixedClock {
    fn now_ms(&self) -> u64 {
        self.0
    }
}

/// Clock that moves forward by `step` every time it is read
pub struct StepClock {
    next: Cell<u64>,
    step: u64,
}

impl StepClock {
    pub fn new(start: u64, step: u64) -> Self {
        Self {
            next: Cell::new(start),
            step,
        }
    }
}

impl TickSource for StepClock {
    fn now_ms(&self) -> u64 {
        let now = self.next.get();
        self.next.set(now + self.step);
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    #[test]
    fn test_recording_storage_reads_back() {
        let mut storage = RecordingStorage::new();
        let setup = StorageSetup::sd_card("LOG.CSV").unwrap();
        let mut buf = [0u8; 8];

        let n = block_on(async {
            storage.configure(&setup).await.unwrap();
            storage.enable().await.unwrap();
            storage.append(StorageMedium::SdCard, 0, b"abc").await.unwrap();
            storage.append(StorageMedium::SdCard, 3, b"def").await.unwrap();
            storage.read(StorageMedium::SdCard, 2, &mut buf).await.unwrap()
        });

        assert_eq!(&buf[..n], b"cdef");
    }
}
