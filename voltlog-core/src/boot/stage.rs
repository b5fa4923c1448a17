//! Bootstrap stage definitions

/// Bootstrap stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Stage {
    /// One-time grace period so the rest of the board can settle
    AwaitProcessorDelay,
    /// Initialize the battery sensor
    SetupSubsystems,
    /// Hand over to task creation
    EnableSubsystems,
    /// Spawn the periodic sampler task
    CreateTasks,
}

impl Stage {
    /// All stages in the order they run
    pub const ALL: [Stage; 4] = [
        Stage::AwaitProcessorDelay,
        Stage::SetupSubsystems,
        Stage::EnableSubsystems,
        Stage::CreateTasks,
    ];

    /// The stage submitted by the process entry point
    pub const fn first() -> Self {
        Stage::AwaitProcessorDelay
    }

    /// The stage this one schedules on success
    pub const fn next(self) -> Option<Stage> {
        match self {
            Stage::AwaitProcessorDelay => Some(Stage::SetupSubsystems),
            Stage::SetupSubsystems => Some(Stage::EnableSubsystems),
            Stage::EnableSubsystems => Some(Stage::CreateTasks),
            Stage::CreateTasks => None,
        }
    }

    /// The stage that must have completed before this one may run
    pub const fn predecessor(self) -> Option<Stage> {
        match self {
            Stage::AwaitProcessorDelay => None,
            Stage::SetupSubsystems => Some(Stage::AwaitProcessorDelay),
            Stage::EnableSubsystems => Some(Stage::SetupSubsystems),
            Stage::CreateTasks => Some(Stage::EnableSubsystems),
        }
    }

    /// Bit used to track completion of this stage
    pub(crate) const fn mask(self) -> u8 {
        1 << (self as u8)
    }

    /// Short name for log output
    pub const fn name(self) -> &'static str {
        match self {
            Stage::AwaitProcessorDelay => "await_processor_delay",
            Stage::SetupSubsystems => "setup_subsystems",
            Stage::EnableSubsystems => "enable_subsystems",
            Stage::CreateTasks => "create_tasks",
        }
    }
}
