//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod experiment;
pub mod job;
mod notify;
pub mod scheduling;

pub use experiment::{
    CloneExperimentCommand, CloneExperimentHandler, CreateExperimentCommand,
    CreateExperimentHandler, CreateExperimentResult, ExperimentStatusView,
    GetExperimentStatusHandler, GetExperimentStatusQuery, RecordExperimentStatusCommand,
    RecordExperimentStatusHandler, RecordExperimentStatusResult, RecordMetricCommand,
    RecordMetricHandler,
};
pub use job::{
    CreateExperimentJobCommand, CreateExperimentJobHandler, CreateExperimentJobResult,
    RecordJobStatusCommand, RecordJobStatusHandler, RecordJobStatusResult,
};
pub use scheduling::{
    ScheduleExperimentCommand, ScheduleExperimentError, ScheduleExperimentHandler,
    ScheduleExperimentResult, ScheduleExperimentTask,
};
