//! Experiment job entity.
//!
//! A job is one unit of work spawned when an experiment is scheduled. Its
//! definition is fixed at creation; progress is only ever recorded by
//! appending to its status ledger.

use serde_json::Value as JsonValue;

use crate::domain::foundation::{ExperimentId, ExperimentJobId, Timestamp};
use crate::domain::lifecycle::{JobStatus, JobStatusHistory, StatusEvent, StatusHistory};

/// A job owned by exactly one experiment.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentJob {
    id: ExperimentJobId,
    experiment_id: ExperimentId,
    definition: JsonValue,
    created_at: Timestamp,
    history: JobStatusHistory,
}

impl ExperimentJob {
    /// Creates a job with an empty ledger.
    pub fn new(id: ExperimentJobId, experiment_id: ExperimentId, definition: JsonValue) -> Self {
        Self {
            id,
            experiment_id,
            definition,
            created_at: Timestamp::now(),
            history: StatusHistory::new(id),
        }
    }

    /// Reconstitute a job from persistence (no validation, no events).
    pub fn reconstitute(
        id: ExperimentJobId,
        experiment_id: ExperimentId,
        definition: JsonValue,
        created_at: Timestamp,
        events: Vec<StatusEvent<JobStatus>>,
    ) -> Self {
        Self {
            id,
            experiment_id,
            definition,
            created_at,
            history: StatusHistory::from_events(id, events),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> ExperimentJobId {
        self.id
    }

    pub fn experiment_id(&self) -> ExperimentId {
        self.experiment_id
    }

    /// Resolved job definition. Immutable after creation.
    pub fn definition(&self) -> &JsonValue {
        &self.definition
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn history(&self) -> &JobStatusHistory {
        &self.history
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Derived lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Latest recorded status; `None` if the job has not reported yet.
    pub fn last_status(&self) -> Option<JobStatus> {
        self.history.last_status()
    }

    pub fn is_running(&self) -> bool {
        self.history.is_running()
    }

    pub fn is_done(&self) -> bool {
        self.history.is_done()
    }

    /// Time of the first `building` event.
    pub fn started_at(&self) -> Option<Timestamp> {
        self.history.started_at()
    }

    /// Time of the last terminal event.
    pub fn finished_at(&self) -> Option<Timestamp> {
        self.history.finished_at()
    }
}
