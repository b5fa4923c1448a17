//! Embassy async tasks
//!
//! The dispatcher task runs the bootstrap stages; its last stage spawns the
//! sampler task, which then runs forever on its own.

pub mod dispatcher;
pub mod sampler;

pub use dispatcher::dispatcher_task;
pub use sampler::sampler_task;
