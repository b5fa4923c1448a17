//! Staged bootstrap sequence
//!
//! Startup is a chain of stages, each submitted as one unit of deferred
//! work to a single-worker dispatcher. A stage either schedules its
//! successor or fails, and any failure is fatal to the boot.

pub mod sequencer;
pub mod stage;

pub use sequencer::{
    start, BootError, BootPlatform, Dispatch, EnqueueError, Sequencer, SpawnError, StageOutcome,
};
pub use stage::Stage;
