//! Periodic sample-and-persist cycle
//!
//! Each period the sampler opens a storage session, measures the battery,
//! renders one text record and appends it to the log file. Every failure
//! inside a cycle is recoverable: it is reported in the [`CycleReport`] and
//! the session is still walked back to `Closed`.

pub mod cycle;
pub mod record;
pub mod schedule;
pub mod session;

pub use cycle::{CycleError, CycleReport, Sampler, TickSource, SAMPLE_PERIOD_MS};
pub use record::{format_record, FormatError, Measurement, WriteBuffer, WRITE_BUFFER_LEN};
pub use schedule::WakeSchedule;
pub use session::{CleanupReport, SessionState, StorageSession};
