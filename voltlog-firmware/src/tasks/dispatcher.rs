//! Single-worker bootstrap dispatcher
//!
//! Runs queued stages strictly one at a time, in submission order. A stage
//! only queues its successor, so each one starts on a fresh iteration of
//! this loop rather than inside its predecessor.

use defmt::*;

use voltlog_core::boot::{Sequencer, StageOutcome};

use crate::boot::BoardBoot;
use crate::channels::Dispatcher;
use crate::fault;

/// Dispatcher task - drains the stage queue
#[embassy_executor::task]
pub async fn dispatcher_task(dispatcher: &'static Dispatcher, mut board: BoardBoot) {
    info!("Dispatcher task started");

    let mut sequencer = Sequencer::new(Some(dispatcher));

    loop {
        let stage = dispatcher.next_stage().await;
        info!("Boot stage: {}", stage.name());

        match sequencer.run(stage, &mut board).await {
            Ok(StageOutcome::Scheduled(next)) => debug!("Queued {}", next.name()),
            Ok(StageOutcome::Complete) => info!("Bootstrap complete"),
            Err(e) => fault::halt(e),
        }
    }
}
