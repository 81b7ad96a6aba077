//! GetExperimentStatusHandler - Query handler for an experiment's progress.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::experiment::ExperimentError;
use crate::domain::foundation::{ExperimentId, ExperimentJobId, Timestamp};
use crate::domain::lifecycle::{ExperimentStatus, JobStatus, StatusAggregator};
use crate::ports::StatusLedger;

/// Query for the status view of one experiment.
#[derive(Debug, Clone)]
pub struct GetExperimentStatusQuery {
    pub experiment_id: ExperimentId,
}

/// Status of an experiment as seen from both its own ledger and its jobs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentStatusView {
    pub experiment_id: ExperimentId,
    /// Latest entry in the experiment's own ledger.
    pub last_status: Option<ExperimentStatus>,
    /// Status derived from the latest status of every job.
    pub calculated_status: ExperimentStatus,
    pub is_running: bool,
    pub is_done: bool,
    pub started_at: Option<Timestamp>,
    pub finished_at: Option<Timestamp>,
    pub job_statuses: Vec<(ExperimentJobId, Option<JobStatus>)>,
}

/// Handler for reading experiment status.
pub struct GetExperimentStatusHandler {
    ledger: Arc<dyn StatusLedger>,
}

impl GetExperimentStatusHandler {
    pub fn new(ledger: Arc<dyn StatusLedger>) -> Self {
        Self { ledger }
    }

    pub async fn handle(
        &self,
        query: GetExperimentStatusQuery,
    ) -> Result<ExperimentStatusView, ExperimentError> {
        let (history, job_statuses) = futures::try_join!(
            self.ledger.experiment_history(query.experiment_id),
            self.ledger.latest_job_statuses(query.experiment_id),
        )?;

        let calculated_status =
            StatusAggregator::calculate(job_statuses.iter().map(|(_, status)| *status));

        Ok(ExperimentStatusView {
            experiment_id: query.experiment_id,
            last_status: history.last_status(),
            calculated_status,
            is_running: history.is_running(),
            is_done: history.is_done(),
            started_at: history.started_at(),
            finished_at: history.finished_at(),
            job_statuses,
        })
    }
}
