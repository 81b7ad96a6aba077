//! Task-queue entry point for `experiments.schedule`.

use async_trait::async_trait;

use crate::domain::scheduling::{ExperimentTaskPayload, TaskName};
use crate::ports::{OperationError, TaskHandler};

use super::schedule_experiment::{
    ScheduleExperimentCommand, ScheduleExperimentError, ScheduleExperimentHandler,
};

/// Runs `ScheduleExperimentHandler` for queued schedule requests.
pub struct ScheduleExperimentTask {
    handler: ScheduleExperimentHandler,
}

impl ScheduleExperimentTask {
    pub fn new(handler: ScheduleExperimentHandler) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl TaskHandler for ScheduleExperimentTask {
    fn task_name(&self) -> TaskName {
        TaskName::ScheduleExperiment
    }

    async fn run(&self, payload: ExperimentTaskPayload) -> Result<(), OperationError> {
        let experiment_id = payload.experiment_id;
        match self
            .handler
            .handle(ScheduleExperimentCommand { experiment_id })
            .await
        {
            Ok(_) => Ok(()),
            Err(ScheduleExperimentError::ReferenceGone { reason, .. }) => Err(
                OperationError::permanent(TaskName::ScheduleExperiment, experiment_id, reason),
            ),
            Err(e) if e.is_retryable() => Err(OperationError::transient(
                TaskName::ScheduleExperiment,
                experiment_id,
                e.to_string(),
            )),
            Err(e) => Err(OperationError::permanent(
                TaskName::ScheduleExperiment,
                experiment_id,
                e.to_string(),
            )),
        }
    }
}
