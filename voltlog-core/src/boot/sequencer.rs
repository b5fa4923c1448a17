//! Bootstrap sequencer
//!
//! Runs one stage per dispatcher callback and schedules the successor only
//! after the current stage succeeded. The sequencer never calls the next
//! stage directly; it enqueues it and returns, so every stage starts on a
//! clean frame of the dispatcher worker.

use super::stage::Stage;
use crate::traits::SensorError;

/// Errors from submitting work to the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EnqueueError {
    /// The dispatch queue has no free slot
    QueueFull,
}

/// Errors from creating the sampler task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpawnError {
    /// The executor has no free task slot
    Busy,
    /// Sensor or storage already handed to a task
    MissingResources,
}

/// Fatal bootstrap errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootError {
    /// Entry point invoked without a dispatcher handle
    NullDependency,
    /// Sensor subsystem failed to initialize
    SubsystemInit(SensorError),
    /// Next stage could not be queued
    Enqueue(EnqueueError),
    /// Sampler task could not be created
    OutOfResources(SpawnError),
    /// Stage already ran during this boot
    Reentered(Stage),
    /// Stage ran before its predecessor completed
    OutOfOrder(Stage),
    /// An earlier stage failed; nothing else may run
    Halted,
}

impl From<EnqueueError> for BootError {
    fn from(e: EnqueueError) -> Self {
        BootError::Enqueue(e)
    }
}

impl From<SensorError> for BootError {
    fn from(e: SensorError) -> Self {
        BootError::SubsystemInit(e)
    }
}

impl From<SpawnError> for BootError {
    fn from(e: SpawnError) -> Self {
        BootError::OutOfResources(e)
    }
}

/// Enqueue-only capability on the deferred dispatcher
///
/// The dispatcher runs queued stages one at a time, in submission order.
pub trait Dispatch {
    /// Submit `stage` for later execution
    fn enqueue(&self, stage: Stage) -> Result<(), EnqueueError>;
}

/// Board services the bootstrap stages act on
pub trait BootPlatform {
    /// Block for the one-time startup grace period
    fn startup_delay(&mut self) -> impl core::future::Future<Output = ()>;

    /// Initialize the battery sensor
    fn setup_sensor(&mut self) -> impl core::future::Future<Output = Result<(), SensorError>>;

    /// Create the periodic sampler task
    fn spawn_sampler(&mut self) -> Result<(), SpawnError>;
}

/// Result of a successful stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StageOutcome {
    /// The given stage was queued as the successor
    Scheduled(Stage),
    /// The final stage ran; bootstrap is finished
    Complete,
}

/// Process entry: submit the first stage
///
/// # Errors
/// [`BootError::NullDependency`] if no dispatcher is given, or the
/// dispatcher's enqueue error.
pub fn start<D: Dispatch>(dispatcher: Option<&D>) -> Result<(), BootError> {
    let dispatcher = dispatcher.ok_or(BootError::NullDependency)?;
    dispatcher.enqueue(Stage::first())?;
    Ok(())
}

/// Bootstrap sequencer
///
/// Tracks which stages completed so each one runs exactly once, in order.
/// After the first failure every further stage is refused.
pub struct Sequencer<'d, D> {
    dispatcher: Option<&'d D>,
    completed: u8,
    halted: bool,
}

impl<'d, D: Dispatch> Sequencer<'d, D> {
    /// Create a sequencer bound to the dispatcher captured at boot
    pub const fn new(dispatcher: Option<&'d D>) -> Self {
        Self {
            dispatcher,
            completed: 0,
            halted: false,
        }
    }

    /// Check if a stage has completed
    pub fn has_completed(&self, stage: Stage) -> bool {
        self.completed & stage.mask() != 0
    }

    /// Check if the final stage has completed
    pub fn is_complete(&self) -> bool {
        self.has_completed(Stage::CreateTasks)
    }

    /// Check if a stage has failed
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Run one stage
    ///
    /// On success the stage is marked complete and its successor, if any,
    /// has been queued. On failure the sequencer halts; the caller must hand
    /// the error to the fault handler.
    pub async fn run<P: BootPlatform>(
        &mut self,
        stage: Stage,
        platform: &mut P,
    ) -> Result<StageOutcome, BootError> {
        if self.halted {
            return Err(BootError::Halted);
        }

        match self.execute(stage, platform).await {
            Ok(outcome) => {
                self.completed |= stage.mask();
                Ok(outcome)
            }
            Err(e) => {
                self.halted = true;
                Err(e)
            }
        }
    }

    async fn execute<P: BootPlatform>(
        &self,
        stage: Stage,
        platform: &mut P,
    ) -> Result<StageOutcome, BootError> {
        if self.has_completed(stage) {
            return Err(BootError::Reentered(stage));
        }
        if let Some(prev) = stage.predecessor() {
            if !self.has_completed(prev) {
                return Err(BootError::OutOfOrder(stage));
            }
        }

        match stage {
            Stage::AwaitProcessorDelay => {
                platform.startup_delay().await;
                let dispatcher = self.dispatcher()?;
                Self::schedule(dispatcher, stage)
            }
            Stage::SetupSubsystems => {
                let dispatcher = self.dispatcher()?;
                platform.setup_sensor().await?;
                Self::schedule(dispatcher, stage)
            }
            Stage::EnableSubsystems => {
                let dispatcher = self.dispatcher()?;
                Self::schedule(dispatcher, stage)
            }
            Stage::CreateTasks => {
                platform.spawn_sampler()?;
                Ok(StageOutcome::Complete)
            }
        }
    }

    fn dispatcher(&self) -> Result<&'d D, BootError> {
        self.dispatcher.ok_or(BootError::NullDependency)
    }

    fn schedule(dispatcher: &D, current: Stage) -> Result<StageOutcome, BootError> {
        match current.next() {
            Some(next) => {
                dispatcher.enqueue(next)?;
                Ok(StageOutcome::Scheduled(next))
            }
            None => Ok(StageOutcome::Complete),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakePlatform, QueueDispatcher};
    use embassy_futures::block_on;

    /// Result of draining the dispatcher the way the firmware worker does
    struct BootTrace {
        ran: Vec<Stage>,
        faults: Vec<BootError>,
        complete: bool,
    }

    fn boot(dispatcher: &QueueDispatcher, platform: &mut FakePlatform) -> BootTrace {
        let mut sequencer = Sequencer::new(Some(dispatcher));
        let mut trace = BootTrace {
            ran: Vec::new(),
            faults: Vec::new(),
            complete: false,
        };

        if let Err(e) = start(Some(dispatcher)) {
            trace.faults.push(e);
            return trace;
        }

        while let Some(stage) = dispatcher.pop() {
            trace.ran.push(stage);
            if let Err(e) = block_on(sequencer.run(stage, platform)) {
                trace.faults.push(e);
            }
        }

        trace.complete = sequencer.is_complete();
        trace
    }

    #[test]
    fn test_full_boot() {
        let dispatcher = QueueDispatcher::new();
        let mut platform = FakePlatform::healthy();

        let trace = boot(&dispatcher, &mut platform);

        assert_eq!(trace.ran, Stage::ALL.to_vec());
        assert!(trace.faults.is_empty());
        assert!(trace.complete);
        assert_eq!(platform.delays, 1);
        assert_eq!(platform.sensor_inits, 1);
        assert_eq!(platform.spawns, 1);
    }

    #[test]
    fn test_sensor_failure_halts_before_enable() {
        let dispatcher = QueueDispatcher::new();
        let mut platform = FakePlatform::healthy();
        platform.sensor_result = Err(SensorError::NoSignal);

        let trace = boot(&dispatcher, &mut platform);

        assert_eq!(
            trace.ran,
            vec![Stage::AwaitProcessorDelay, Stage::SetupSubsystems]
        );
        assert_eq!(
            trace.faults,
            vec![BootError::SubsystemInit(SensorError::NoSignal)]
        );
        assert!(!dispatcher.history().contains(&Stage::EnableSubsystems));
        assert_eq!(platform.spawns, 0);
    }

    #[test]
    fn test_enqueue_failure_halts() {
        let dispatcher = QueueDispatcher::refusing(Stage::CreateTasks);
        let mut platform = FakePlatform::healthy();

        let trace = boot(&dispatcher, &mut platform);

        assert_eq!(trace.ran.last(), Some(&Stage::EnableSubsystems));
        assert_eq!(
            trace.faults,
            vec![BootError::Enqueue(EnqueueError::QueueFull)]
        );
        assert_eq!(platform.spawns, 0);
        assert!(!trace.complete);
    }

    #[test]
    fn test_spawn_failure_is_out_of_resources() {
        let dispatcher = QueueDispatcher::new();
        let mut platform = FakePlatform::healthy();
        platform.spawn_result = Err(SpawnError::Busy);

        let trace = boot(&dispatcher, &mut platform);

        assert_eq!(trace.ran, Stage::ALL.to_vec());
        assert_eq!(
            trace.faults,
            vec![BootError::OutOfResources(SpawnError::Busy)]
        );
        assert!(!trace.complete);
    }

    #[test]
    fn test_exactly_one_fault_for_any_failing_stage() {
        let failures: [(&str, fn(&mut FakePlatform), Option<Stage>); 4] = [
            ("sensor", |p| p.sensor_result = Err(SensorError::Conversion), None),
            ("spawn", |p| p.spawn_result = Err(SpawnError::Busy), None),
            ("enqueue setup", |_| {}, Some(Stage::SetupSubsystems)),
            ("enqueue enable", |_| {}, Some(Stage::EnableSubsystems)),
        ];

        for (label, inject, refused) in failures {
            let dispatcher = match refused {
                Some(stage) => QueueDispatcher::refusing(stage),
                None => QueueDispatcher::new(),
            };
            let mut platform = FakePlatform::healthy();
            inject(&mut platform);

            let trace = boot(&dispatcher, &mut platform);

            assert_eq!(trace.faults.len(), 1, "{label}: expected one fault");
            assert!(dispatcher.is_empty(), "{label}: stage queued after fault");
            assert!(!trace.complete, "{label}: boot must not complete");
        }
    }

    #[test]
    fn test_start_without_dispatcher() {
        assert_eq!(
            start::<QueueDispatcher>(None),
            Err(BootError::NullDependency)
        );
    }

    #[test]
    fn test_stage_without_dispatcher() {
        let mut sequencer: Sequencer<'_, QueueDispatcher> = Sequencer::new(None);
        let mut platform = FakePlatform::healthy();

        let result = block_on(sequencer.run(Stage::AwaitProcessorDelay, &mut platform));

        assert_eq!(result, Err(BootError::NullDependency));
        // The grace period still elapses before the handle is checked
        assert_eq!(platform.delays, 1);
        assert!(sequencer.is_halted());
    }

    #[test]
    fn test_reentry_rejected() {
        let dispatcher = QueueDispatcher::new();
        let mut sequencer = Sequencer::new(Some(&dispatcher));
        let mut platform = FakePlatform::healthy();

        let first = block_on(sequencer.run(Stage::AwaitProcessorDelay, &mut platform));
        assert_eq!(first, Ok(StageOutcome::Scheduled(Stage::SetupSubsystems)));

        let again = block_on(sequencer.run(Stage::AwaitProcessorDelay, &mut platform));
        assert_eq!(again, Err(BootError::Reentered(Stage::AwaitProcessorDelay)));
        assert_eq!(platform.delays, 1);
    }

    #[test]
    fn test_out_of_order_rejected() {
        let dispatcher = QueueDispatcher::new();
        let mut sequencer = Sequencer::new(Some(&dispatcher));
        let mut platform = FakePlatform::healthy();

        let result = block_on(sequencer.run(Stage::CreateTasks, &mut platform));

        assert_eq!(result, Err(BootError::OutOfOrder(Stage::CreateTasks)));
        assert_eq!(platform.spawns, 0);
    }

    #[test]
    fn test_halted_refuses_everything() {
        let dispatcher = QueueDispatcher::new();
        let mut sequencer = Sequencer::new(Some(&dispatcher));
        let mut platform = FakePlatform::healthy();
        platform.sensor_result = Err(SensorError::Saturated);

        block_on(sequencer.run(Stage::AwaitProcessorDelay, &mut platform)).unwrap();
        let _ = dispatcher.pop();
        assert!(block_on(sequencer.run(Stage::SetupSubsystems, &mut platform)).is_err());

        platform.sensor_result = Ok(());
        for stage in Stage::ALL {
            assert_eq!(
                block_on(sequencer.run(stage, &mut platform)),
                Err(BootError::Halted)
            );
        }
        assert_eq!(platform.sensor_inits, 1);
    }
}
