//! Experiment job repository port.

use async_trait::async_trait;

use crate::domain::experiment::ExperimentJob;
use crate::domain::foundation::{DomainError, ExperimentId, ExperimentJobId};

/// Repository port for experiment jobs.
#[async_trait]
pub trait ExperimentJobRepository: Send + Sync {
    /// Store a new job under its experiment.
    ///
    /// # Errors
    ///
    /// - `ExperimentNotFound` if the owning experiment doesn't exist
    /// - `ValidationFailed` if a job with this id already exists
    /// - `ValidationFailed` if the job's ledger is not empty; statuses are
    ///   only recorded through `StatusLedger::append_job_status`
    async fn save(&self, job: &ExperimentJob) -> Result<(), DomainError>;

    /// Find a job with its ledger attached.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: ExperimentJobId) -> Result<Option<ExperimentJob>, DomainError>;

    /// Find every job of an experiment, in creation order.
    async fn find_by_experiment_id(
        &self,
        experiment_id: ExperimentId,
    ) -> Result<Vec<ExperimentJob>, DomainError>;
}
