//! Experiment job command handlers.

mod create_job;
mod record_job_status;

pub use create_job::{
    CreateExperimentJobCommand, CreateExperimentJobHandler, CreateExperimentJobResult,
};
pub use record_job_status::{
    RecordJobStatusCommand, RecordJobStatusHandler, RecordJobStatusResult,
};
