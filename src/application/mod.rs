//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Mutating handlers publish a notification after the mutation succeeds;
//! listeners react to those notifications.

pub mod handlers;
pub mod listeners;

pub use handlers::{
    // Experiment handlers
    CloneExperimentCommand, CloneExperimentHandler, CreateExperimentCommand,
    CreateExperimentHandler, CreateExperimentResult, ExperimentStatusView,
    GetExperimentStatusHandler, GetExperimentStatusQuery, RecordExperimentStatusCommand,
    RecordExperimentStatusHandler, RecordExperimentStatusResult, RecordMetricCommand,
    RecordMetricHandler,
    // Job handlers
    CreateExperimentJobCommand, CreateExperimentJobHandler, CreateExperimentJobResult,
    RecordJobStatusCommand, RecordJobStatusHandler, RecordJobStatusResult,
    // Scheduling handlers
    ScheduleExperimentCommand, ScheduleExperimentError, ScheduleExperimentHandler,
    ScheduleExperimentResult, ScheduleExperimentTask,
};
pub use listeners::ScheduleOnCreate;
