//! Experiment command and query handlers.

mod clone_experiment;
mod create_experiment;
mod get_experiment_status;
mod record_experiment_status;
mod record_metric;

pub use clone_experiment::{CloneExperimentCommand, CloneExperimentHandler};
pub use create_experiment::{
    CreateExperimentCommand, CreateExperimentHandler, CreateExperimentResult,
};
pub use get_experiment_status::{
    ExperimentStatusView, GetExperimentStatusHandler, GetExperimentStatusQuery,
};
pub use record_experiment_status::{
    RecordExperimentStatusCommand, RecordExperimentStatusHandler, RecordExperimentStatusResult,
};
pub use record_metric::{RecordMetricCommand, RecordMetricHandler};
