//! RecordExperimentStatusHandler - Appends to an experiment's own ledger.
//!
//! Experiment-level statuses are set by the orchestration that drives the
//! experiment (for example `starting` once build tasks are dispatched).
//! They are not derived from job statuses and are not broadcast.

use serde_json::Value as JsonValue;
use std::sync::Arc;

use crate::domain::experiment::ExperimentError;
use crate::domain::foundation::{CommandMetadata, ExperimentId, Timestamp};
use crate::domain::lifecycle::{ExperimentStatus, NewStatusEvent, StatusEvent};
use crate::ports::StatusLedger;

/// Command to record an experiment status.
#[derive(Debug, Clone)]
pub struct RecordExperimentStatusCommand {
    pub experiment_id: ExperimentId,
    /// Status label, e.g. `"starting"`.
    pub status: String,
    pub message: Option<String>,
    pub details: Option<JsonValue>,
    pub at: Option<Timestamp>,
}

impl RecordExperimentStatusCommand {
    pub fn new(experiment_id: ExperimentId, status: impl Into<String>) -> Self {
        Self {
            experiment_id,
            status: status.into(),
            message: None,
            details: None,
            at: None,
        }
    }
}

/// Result of recording an experiment status.
#[derive(Debug, Clone)]
pub struct RecordExperimentStatusResult {
    pub event: StatusEvent<ExperimentStatus>,
    pub previous_status: Option<ExperimentStatus>,
}

/// Handler for recording experiment statuses.
pub struct RecordExperimentStatusHandler {
    ledger: Arc<dyn StatusLedger>,
}

impl RecordExperimentStatusHandler {
    pub fn new(ledger: Arc<dyn StatusLedger>) -> Self {
        Self { ledger }
    }

    pub async fn handle(
        &self,
        cmd: RecordExperimentStatusCommand,
        metadata: CommandMetadata,
    ) -> Result<RecordExperimentStatusResult, ExperimentError> {
        let mut event = NewStatusEvent::<ExperimentStatus>::from_label(&cmd.status)?;
        if let Some(message) = cmd.message {
            event = event.with_message(message);
        }
        if let Some(details) = cmd.details {
            event = event.with_details(details);
        }
        if let Some(at) = cmd.at {
            event = event.at(at);
        }

        let appended = self
            .ledger
            .append_experiment_status(cmd.experiment_id, event)
            .await?;

        tracing::info!(
            experiment_id = %cmd.experiment_id,
            status = %appended.event.status,
            previous = ?appended.previous,
            sequence = appended.event.sequence,
            correlation_id = %metadata.correlation_id(),
            "experiment status recorded"
        );

        Ok(RecordExperimentStatusResult {
            event: appended.event,
            previous_status: appended.previous,
        })
    }
}
