//! Experiment domain module.
//!
//! Experiments, the jobs they own, their metrics and clone lineage.
//!
//! # Events
//!
//! - `ExperimentCreated` - Published when an experiment is stored
//! - `ExperimentJobCreated` - Published when a job is stored
//! - `ExperimentJobStatusChanged` - Published when a job status is appended

mod errors;
mod events;
#[allow(clippy::module_inception)]
mod experiment;
mod job;
mod lineage;
mod metric;

pub use errors::ExperimentError;
pub use events::{
    ExperimentCreated, ExperimentJobCreated, ExperimentJobStatusChanged, EXPERIMENT_CREATED,
    EXPERIMENT_JOB_CREATED, EXPERIMENT_JOB_STATUS,
};
pub use experiment::{Experiment, ExperimentBuilder, MAX_NAME_LENGTH};
pub use job::ExperimentJob;
pub use lineage::validate_lineage;
pub use metric::ExperimentMetric;
