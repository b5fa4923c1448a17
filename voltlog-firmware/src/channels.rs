//! Bootstrap dispatch queue
//!
//! Stages are queued on a static channel and run one at a time by the
//! dispatcher task. The bootstrap code only sees the enqueue side.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use voltlog_core::boot::{Dispatch, EnqueueError, Stage};

/// Channel capacity for pending bootstrap stages
///
/// Each stage queues only its successor, so one slot would do; the second
/// covers the entry stage queued while the worker is still starting.
const STAGE_QUEUE_SIZE: usize = 2;

/// Pending bootstrap stages, drained by the dispatcher task
static STAGE_QUEUE: Channel<CriticalSectionRawMutex, Stage, STAGE_QUEUE_SIZE> = Channel::new();

/// Handle on the stage queue
pub struct Dispatcher {
    queue: &'static Channel<CriticalSectionRawMutex, Stage, STAGE_QUEUE_SIZE>,
}

impl Dispatcher {
    /// Wait for the next queued stage
    pub async fn next_stage(&self) -> Stage {
        self.queue.receive().await
    }
}

impl Dispatch for Dispatcher {
    fn enqueue(&self, stage: Stage) -> Result<(), EnqueueError> {
        self.queue
            .try_send(stage)
            .map_err(|_| EnqueueError::QueueFull)
    }
}

/// The process-wide dispatcher, created once and never destroyed
pub static DISPATCHER: Dispatcher = Dispatcher {
    queue: &STAGE_QUEUE,
};
