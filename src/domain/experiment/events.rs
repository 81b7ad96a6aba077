//! Lifecycle notifications.
//!
//! One notification per successful mutation:
//! - `ExperimentCreated` - New experiment stored
//! - `ExperimentJobCreated` - New job stored under an experiment
//! - `ExperimentJobStatusChanged` - Status appended to a job's ledger

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    domain_event, ClusterId, EventId, ExperimentId, ExperimentJobId, ProjectId, SpecId, Timestamp,
    UserId,
};
use crate::domain::lifecycle::{JobStatus, StatusEvent};

use super::{Experiment, ExperimentJob};

/// Event type of [`ExperimentCreated`].
pub const EXPERIMENT_CREATED: &str = "experiment.created.v1";
/// Event type of [`ExperimentJobCreated`].
pub const EXPERIMENT_JOB_CREATED: &str = "experiment_job.created.v1";
/// Event type of [`ExperimentJobStatusChanged`].
pub const EXPERIMENT_JOB_STATUS: &str = "experiment_job.status.v1";

// ════════════════════════════════════════════════════════════════════════════
// ExperimentCreated
// ════════════════════════════════════════════════════════════════════════════

/// Published when a new experiment is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentCreated {
    pub event_id: EventId,
    pub experiment_id: ExperimentId,
    pub cluster_id: ClusterId,
    pub project_id: ProjectId,
    pub owner: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec_id: Option<SpecId>,
    /// Set when the experiment is a clone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_experiment: Option<ExperimentId>,
    pub created_at: Timestamp,
}

domain_event!(
    ExperimentCreated,
    event_type = EXPERIMENT_CREATED,
    entity_id = experiment_id,
    entity_kind = "Experiment",
    occurred_at = created_at,
    event_id = event_id
);

impl ExperimentCreated {
    pub fn from_experiment(experiment: &Experiment) -> Self {
        Self {
            event_id: EventId::new(),
            experiment_id: experiment.id(),
            cluster_id: experiment.cluster_id(),
            project_id: experiment.project_id(),
            owner: experiment.owner().clone(),
            spec_id: experiment.spec_id(),
            original_experiment: experiment.original_experiment(),
            created_at: experiment.created_at(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ExperimentJobCreated
// ════════════════════════════════════════════════════════════════════════════

/// Published when a job is stored under an experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentJobCreated {
    pub event_id: EventId,
    pub job_id: ExperimentJobId,
    pub experiment_id: ExperimentId,
    pub created_at: Timestamp,
}

domain_event!(
    ExperimentJobCreated,
    event_type = EXPERIMENT_JOB_CREATED,
    entity_id = job_id,
    entity_kind = "ExperimentJob",
    occurred_at = created_at,
    event_id = event_id
);

impl ExperimentJobCreated {
    pub fn from_job(job: &ExperimentJob) -> Self {
        Self {
            event_id: EventId::new(),
            job_id: job.id(),
            experiment_id: job.experiment_id(),
            created_at: job.created_at(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ExperimentJobStatusChanged
// ════════════════════════════════════════════════════════════════════════════

/// Published when a status is appended to a job's ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentJobStatusChanged {
    pub event_id: EventId,
    pub job_id: ExperimentJobId,
    pub experiment_id: ExperimentId,
    pub status: JobStatus,
    /// Latest status before this append, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_status: Option<JobStatus>,
    /// Position of the event in the job's ledger.
    pub sequence: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub created_at: Timestamp,
}

domain_event!(
    ExperimentJobStatusChanged,
    event_type = EXPERIMENT_JOB_STATUS,
    entity_id = job_id,
    entity_kind = "ExperimentJob",
    occurred_at = created_at,
    event_id = event_id
);

impl ExperimentJobStatusChanged {
    pub fn from_event(
        experiment_id: ExperimentId,
        event: &StatusEvent<JobStatus>,
        previous_status: Option<JobStatus>,
    ) -> Self {
        Self {
            event_id: EventId::new(),
            job_id: event.entity_id,
            experiment_id,
            status: event.status,
            previous_status,
            sequence: event.sequence,
            message: event.message.clone(),
            created_at: event.created_at,
        }
    }
}
