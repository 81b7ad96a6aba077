//! ScheduleOnCreate - Listener for `experiment.created.v1`.
//!
//! Requests scheduling for every newly created experiment by enqueueing an
//! `experiments.schedule` task. The task carries only the experiment id;
//! `ScheduleExperimentTask` re-checks the experiment when it runs.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::experiment::{ExperimentCreated, EXPERIMENT_CREATED};
use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::domain::scheduling::{ExperimentTaskPayload, TaskName};
use crate::ports::{LifecycleListener, TaskQueue};

/// Enqueues a schedule task when an experiment is created.
pub struct ScheduleOnCreate {
    queue: Arc<dyn TaskQueue>,
}

impl ScheduleOnCreate {
    pub fn new(queue: Arc<dyn TaskQueue>) -> Self {
        Self { queue }
    }

    /// Event types this listener should be subscribed to.
    pub fn event_types() -> &'static [&'static str] {
        &[EXPERIMENT_CREATED]
    }
}

#[async_trait]
impl LifecycleListener for ScheduleOnCreate {
    async fn on_event(&self, event: &EventEnvelope) -> Result<(), DomainError> {
        if event.event_type != EXPERIMENT_CREATED {
            return Ok(());
        }

        let created: ExperimentCreated = event
            .payload_as()
            .map_err(|e| DomainError::new(ErrorCode::ValidationFailed, e.to_string()))?;

        let task_id = self
            .queue
            .enqueue(
                TaskName::ScheduleExperiment,
                ExperimentTaskPayload {
                    experiment_id: created.experiment_id,
                },
            )
            .await?;

        tracing::debug!(
            experiment_id = %created.experiment_id,
            task_id = %task_id,
            "scheduling requested"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ScheduleOnCreate"
    }
}
