//! Lifecycle module - status tables, ledgers and aggregation.
//!
//! Everything that knows what a status means lives here. Entities and
//! handlers ask the registry instead of comparing labels.

mod aggregator;
mod history;
mod registry;
mod status;

pub use aggregator::StatusAggregator;
pub use history::{
    NewStatusEvent, PostTerminalPolicy, StatusEvent, StatusHistory, MAX_MESSAGE_LENGTH,
};
pub use registry::{
    experiment_registry, job_registry, LifecycleRegistry, LifecycleRegistryBuilder, Phase,
};
pub use status::{EntityKind, ExperimentStatus, JobStatus, LifecycleStatus};

/// Ledger of an experiment job.
pub type JobStatusHistory = StatusHistory<JobStatus>;

/// Ledger of an experiment's orchestration signals.
pub type ExperimentStatusHistory = StatusHistory<ExperimentStatus>;
