//! CloneExperimentHandler - Command handler for cloning an experiment.
//!
//! A clone copies placement, spec and config from its original and records
//! the original in its lineage. Jobs, statuses and metrics are not copied.

use serde_json::Value as JsonValue;
use std::sync::Arc;

use crate::domain::experiment::ExperimentError;
use crate::domain::foundation::{CommandMetadata, ExperimentId};
use crate::ports::{ExperimentRepository, NotificationPublisher};

use super::create_experiment::{
    CreateExperimentCommand, CreateExperimentHandler, CreateExperimentResult,
};

/// Command to clone an experiment.
#[derive(Debug, Clone)]
pub struct CloneExperimentCommand {
    pub original_id: ExperimentId,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Replaces the original's config when set.
    pub config: Option<JsonValue>,
}

impl CloneExperimentCommand {
    pub fn new(original_id: ExperimentId) -> Self {
        Self {
            original_id,
            name: None,
            description: None,
            config: None,
        }
    }
}

/// Handler for cloning experiments.
pub struct CloneExperimentHandler {
    experiments: Arc<dyn ExperimentRepository>,
    create: CreateExperimentHandler,
}

impl CloneExperimentHandler {
    pub fn new(
        experiments: Arc<dyn ExperimentRepository>,
        publisher: Arc<dyn NotificationPublisher>,
    ) -> Self {
        Self {
            create: CreateExperimentHandler::new(experiments.clone(), publisher),
            experiments,
        }
    }

    pub async fn handle(
        &self,
        cmd: CloneExperimentCommand,
        metadata: CommandMetadata,
    ) -> Result<CreateExperimentResult, ExperimentError> {
        let original = self
            .experiments
            .find_by_id(cmd.original_id)
            .await?
            .ok_or_else(|| ExperimentError::not_found(cmd.original_id))?;

        let create = CreateExperimentCommand {
            experiment_id: None,
            cluster_id: original.cluster_id(),
            project_id: original.project_id(),
            name: cmd.name.or_else(|| original.name().map(str::to_string)),
            description: cmd.description,
            spec_id: original.spec_id(),
            config: cmd.config.unwrap_or_else(|| original.config().clone()),
            original_experiment: Some(original.id()),
        };

        self.create.handle(create, metadata).await
    }
}
