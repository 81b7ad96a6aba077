//! Status ledger port.
//!
//! Append-only storage for job and experiment status events. Appends to
//! one entity's ledger are serialized by the implementation; reads across
//! entities take no locks.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ExperimentId, ExperimentJobId};
use crate::domain::lifecycle::{
    ExperimentStatus, ExperimentStatusHistory, JobStatus, JobStatusHistory, LifecycleStatus,
    NewStatusEvent, StatusEvent,
};

/// Result of a successful append.
#[derive(Debug, Clone, PartialEq)]
pub struct AppendedStatus<S: LifecycleStatus> {
    /// The event as stored.
    pub event: StatusEvent<S>,
    /// Latest status before the append.
    pub previous: Option<S>,
}

/// Port for the per-entity status ledgers.
///
/// Implementations must ensure:
/// - Appends to the same entity are mutually exclusive
/// - A rejected append leaves the ledger untouched
/// - Stored events are never updated or deleted individually
#[async_trait]
pub trait StatusLedger: Send + Sync {
    /// Append a status to a job's ledger.
    ///
    /// # Errors
    ///
    /// - `ExperimentJobNotFound` if the job doesn't exist
    /// - `InvalidStateTransition` if the post-terminal policy rejects it
    /// - `ValidationFailed` for an out-of-order timestamp or oversized message
    async fn append_job_status(
        &self,
        job_id: ExperimentJobId,
        event: NewStatusEvent<JobStatus>,
    ) -> Result<AppendedStatus<JobStatus>, DomainError>;

    /// Snapshot of a job's ledger.
    ///
    /// # Errors
    ///
    /// - `ExperimentJobNotFound` if the job doesn't exist
    async fn job_history(&self, job_id: ExperimentJobId) -> Result<JobStatusHistory, DomainError>;

    /// Append an orchestration signal to an experiment's own ledger.
    ///
    /// # Errors
    ///
    /// - `ExperimentNotFound` if the experiment doesn't exist
    /// - `InvalidStateTransition` if the post-terminal policy rejects it
    async fn append_experiment_status(
        &self,
        experiment_id: ExperimentId,
        event: NewStatusEvent<ExperimentStatus>,
    ) -> Result<AppendedStatus<ExperimentStatus>, DomainError>;

    /// Snapshot of an experiment's own ledger.
    ///
    /// # Errors
    ///
    /// - `ExperimentNotFound` if the experiment doesn't exist
    async fn experiment_history(
        &self,
        experiment_id: ExperimentId,
    ) -> Result<ExperimentStatusHistory, DomainError>;

    /// Latest status of every job of an experiment, in job creation order.
    ///
    /// Read straight from the ledgers, so never stale relative to them.
    ///
    /// # Errors
    ///
    /// - `ExperimentNotFound` if the experiment doesn't exist
    async fn latest_job_statuses(
        &self,
        experiment_id: ExperimentId,
    ) -> Result<Vec<(ExperimentJobId, Option<JobStatus>)>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn StatusLedger) {}
}
