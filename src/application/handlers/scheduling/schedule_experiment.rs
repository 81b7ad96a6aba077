//! ScheduleExperimentHandler - Validates an experiment and dispatches its build.
//!
//! Scheduling may run long after the request was made, so the experiment is
//! fetched again here. A missing experiment rejects the attempt without
//! touching the queue; a present one produces exactly one build request
//! carrying only the experiment id.
//!
//! Running twice for the same experiment enqueues two builds. The build
//! task is expected to tolerate duplicates.

use std::sync::Arc;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ExperimentId};
use crate::domain::scheduling::{
    ExperimentTaskPayload, ScheduleAttempt, TaskName, REFERENCE_GONE_REASON,
};
use crate::ports::{ExperimentRepository, TaskQueue};

/// Command to schedule one experiment.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleExperimentCommand {
    pub experiment_id: ExperimentId,
}

/// Result of a dispatched scheduling attempt.
#[derive(Debug, Clone)]
pub struct ScheduleExperimentResult {
    pub attempt: ScheduleAttempt,
}

/// Errors from scheduling an experiment.
#[derive(Debug, Clone, Error)]
pub enum ScheduleExperimentError {
    /// The experiment was deleted before scheduling ran. Not retryable.
    #[error("Experiment {experiment_id} {reason}")]
    ReferenceGone {
        experiment_id: ExperimentId,
        reason: String,
        attempt: ScheduleAttempt,
    },

    /// The build request could not be enqueued.
    #[error("Could not dispatch build: {0}")]
    Queue(DomainError),

    /// The experiment could not be read.
    #[error("Could not load experiment: {0}")]
    Repository(DomainError),

    /// The attempt state machine refused a transition.
    #[error("Invalid scheduling transition: {0}")]
    InvalidTransition(String),
}

impl ScheduleExperimentError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ScheduleExperimentError::ReferenceGone { .. } => ErrorCode::ReferenceGone,
            ScheduleExperimentError::Queue(_) => ErrorCode::QueueUnavailable,
            ScheduleExperimentError::Repository(e) => e.code,
            ScheduleExperimentError::InvalidTransition(_) => ErrorCode::InvalidStateTransition,
        }
    }

    /// Whether running the same command again could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ScheduleExperimentError::Queue(_) | ScheduleExperimentError::Repository(_)
        )
    }
}

/// Handler for scheduling experiments.
pub struct ScheduleExperimentHandler {
    experiments: Arc<dyn ExperimentRepository>,
    queue: Arc<dyn TaskQueue>,
}

impl ScheduleExperimentHandler {
    pub fn new(experiments: Arc<dyn ExperimentRepository>, queue: Arc<dyn TaskQueue>) -> Self {
        Self { experiments, queue }
    }

    pub async fn handle(
        &self,
        cmd: ScheduleExperimentCommand,
    ) -> Result<ScheduleExperimentResult, ScheduleExperimentError> {
        let mut attempt = ScheduleAttempt::new(cmd.experiment_id);

        // 1. Re-fetch; the experiment may be gone by now
        let exists = self
            .experiments
            .exists(cmd.experiment_id)
            .await
            .map_err(ScheduleExperimentError::Repository)?;

        if !exists {
            attempt
                .reject(REFERENCE_GONE_REASON)
                .map_err(|e| ScheduleExperimentError::InvalidTransition(e.to_string()))?;
            tracing::warn!(
                experiment_id = %cmd.experiment_id,
                reason = REFERENCE_GONE_REASON,
                "scheduling rejected"
            );
            return Err(ScheduleExperimentError::ReferenceGone {
                experiment_id: cmd.experiment_id,
                reason: REFERENCE_GONE_REASON.to_string(),
                attempt,
            });
        }

        attempt
            .validate()
            .map_err(|e| ScheduleExperimentError::InvalidTransition(e.to_string()))?;

        // 2. Dispatch the build; only the id travels
        let task_id = self
            .queue
            .enqueue(
                TaskName::BuildExperiment,
                ExperimentTaskPayload {
                    experiment_id: cmd.experiment_id,
                },
            )
            .await
            .map_err(ScheduleExperimentError::Queue)?;

        attempt
            .dispatch(task_id)
            .map_err(|e| ScheduleExperimentError::InvalidTransition(e.to_string()))?;

        tracing::info!(
            experiment_id = %cmd.experiment_id,
            task_id = %task_id,
            "experiment build dispatched"
        );

        Ok(ScheduleExperimentResult { attempt })
    }
}
