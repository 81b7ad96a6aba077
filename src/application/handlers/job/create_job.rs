//! CreateExperimentJobHandler - Command handler for adding a job.

use serde_json::Value as JsonValue;
use std::sync::Arc;

use crate::application::handlers::notify::publish_notification;
use crate::domain::experiment::{ExperimentError, ExperimentJob, ExperimentJobCreated};
use crate::domain::foundation::{CommandMetadata, ExperimentId, ExperimentJobId};
use crate::ports::{ExperimentJobRepository, ExperimentRepository, NotificationPublisher};

/// Command to create a job under an experiment.
#[derive(Debug, Clone)]
pub struct CreateExperimentJobCommand {
    pub experiment_id: ExperimentId,
    /// Opaque job definition handed to the build step.
    pub definition: JsonValue,
}

/// Result of successful job creation.
#[derive(Debug, Clone)]
pub struct CreateExperimentJobResult {
    pub job: ExperimentJob,
    pub event: ExperimentJobCreated,
}

/// Handler for creating jobs.
pub struct CreateExperimentJobHandler {
    experiments: Arc<dyn ExperimentRepository>,
    jobs: Arc<dyn ExperimentJobRepository>,
    publisher: Arc<dyn NotificationPublisher>,
}

impl CreateExperimentJobHandler {
    pub fn new(
        experiments: Arc<dyn ExperimentRepository>,
        jobs: Arc<dyn ExperimentJobRepository>,
        publisher: Arc<dyn NotificationPublisher>,
    ) -> Self {
        Self {
            experiments,
            jobs,
            publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateExperimentJobCommand,
        metadata: CommandMetadata,
    ) -> Result<CreateExperimentJobResult, ExperimentError> {
        if !self.experiments.exists(cmd.experiment_id).await? {
            return Err(ExperimentError::not_found(cmd.experiment_id));
        }

        let job = ExperimentJob::new(ExperimentJobId::new(), cmd.experiment_id, cmd.definition);
        self.jobs.save(&job).await?;

        tracing::info!(
            job_id = %job.id(),
            experiment_id = %job.experiment_id(),
            "experiment job created"
        );

        let event = ExperimentJobCreated::from_job(&job);
        publish_notification(self.publisher.as_ref(), &event, &metadata).await;

        Ok(CreateExperimentJobResult { job, event })
    }
}
