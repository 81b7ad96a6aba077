//! CreateExperimentHandler - Command handler for creating experiments.

use serde_json::Value as JsonValue;
use std::sync::Arc;

use crate::application::handlers::notify::publish_notification;
use crate::domain::experiment::{validate_lineage, Experiment, ExperimentCreated, ExperimentError};
use crate::domain::foundation::{
    ClusterId, CommandMetadata, DomainError, ErrorCode, ExperimentId, ProjectId, SpecId,
};
use crate::ports::{ExperimentRepository, NotificationPublisher};

/// Command to create a new experiment.
#[derive(Debug, Clone)]
pub struct CreateExperimentCommand {
    /// Caller-chosen id; a fresh one is generated when `None`.
    pub experiment_id: Option<ExperimentId>,
    pub cluster_id: ClusterId,
    pub project_id: ProjectId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub spec_id: Option<SpecId>,
    pub config: JsonValue,
    /// Experiment this one is cloned from.
    pub original_experiment: Option<ExperimentId>,
}

impl CreateExperimentCommand {
    /// An independent experiment with empty config.
    pub fn new(cluster_id: ClusterId, project_id: ProjectId) -> Self {
        Self {
            experiment_id: None,
            cluster_id,
            project_id,
            name: None,
            description: None,
            spec_id: None,
            config: JsonValue::Object(Default::default()),
            original_experiment: None,
        }
    }
}

/// Result of successful experiment creation.
#[derive(Debug, Clone)]
pub struct CreateExperimentResult {
    pub experiment: Experiment,
    pub event: ExperimentCreated,
}

/// Handler for creating experiments.
pub struct CreateExperimentHandler {
    experiments: Arc<dyn ExperimentRepository>,
    publisher: Arc<dyn NotificationPublisher>,
}

impl CreateExperimentHandler {
    pub fn new(
        experiments: Arc<dyn ExperimentRepository>,
        publisher: Arc<dyn NotificationPublisher>,
    ) -> Self {
        Self {
            experiments,
            publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateExperimentCommand,
        metadata: CommandMetadata,
    ) -> Result<CreateExperimentResult, ExperimentError> {
        // 1. Build the experiment (validates name and self-reference)
        let mut builder = Experiment::builder(cmd.cluster_id, cmd.project_id, metadata.user_id.clone())
            .spec(cmd.spec_id)
            .config(cmd.config);
        if let Some(id) = cmd.experiment_id {
            builder = builder.id(id);
        }
        if let Some(name) = cmd.name {
            builder = builder.name(name);
        }
        if let Some(description) = cmd.description {
            builder = builder.description(description);
        }
        if let Some(original) = cmd.original_experiment {
            builder = builder.clone_of(original);
        }
        let experiment = builder.build()?;

        // 2. Check lineage against stored ancestors
        if let Some(original) = experiment.original_experiment() {
            if !self.experiments.exists(original).await? {
                return Err(ExperimentError::not_found(original));
            }
            let ancestry = collect_ancestry(self.experiments.as_ref(), original).await?;
            validate_lineage(experiment.id(), &ancestry)?;
        }

        // 3. Persist
        self.experiments.save(&experiment).await?;

        tracing::info!(
            experiment_id = %experiment.id(),
            cluster_id = %experiment.cluster_id(),
            project_id = %experiment.project_id(),
            is_clone = experiment.is_clone(),
            "experiment created"
        );

        // 4. Notify
        let event = ExperimentCreated::from_experiment(&experiment);
        publish_notification(self.publisher.as_ref(), &event, &metadata).await;

        Ok(CreateExperimentResult { experiment, event })
    }
}

/// Walks `original_experiment` references upwards from `start`.
///
/// The walk stops at a root, at an ancestor that has since been deleted, or
/// after recording the first repeated id.
pub(crate) async fn collect_ancestry(
    experiments: &dyn ExperimentRepository,
    start: ExperimentId,
) -> Result<Vec<ExperimentId>, DomainError> {
    let mut chain = vec![start];
    let mut current = start;
    loop {
        let next = match experiments.original_of(current).await {
            Ok(next) => next,
            Err(e) if e.is(ErrorCode::ExperimentNotFound) => None,
            Err(e) => return Err(e),
        };
        let Some(next) = next else { break };
        let repeated = chain.contains(&next);
        chain.push(next);
        if repeated {
            break;
        }
        current = next;
    }
    Ok(chain)
}
