//! Experiment entity.
//!
//! An experiment owns its jobs and its own status ledger. Its identity,
//! placement and config are fixed when it is built; everything about its
//! progress is derived from ledgers.
//!
//! # Invariants
//!
//! - `is_clone()` iff `original_experiment` is set
//! - `is_independent()` iff no spec reference is set
//! - `name` is at most 256 characters and not blank when present

use serde_json::Value as JsonValue;

use crate::domain::foundation::{
    ClusterId, DomainError, ExperimentId, ExperimentJobId, ProjectId, SpecId, Timestamp, UserId,
};
use crate::domain::lifecycle::{
    ExperimentStatus, ExperimentStatusHistory, JobStatus, StatusAggregator,
    StatusEvent, StatusHistory,
};

use super::job::ExperimentJob;

/// Maximum length for experiment names.
pub const MAX_NAME_LENGTH: usize = 256;

/// An experiment and the jobs it spawned.
#[derive(Debug, Clone, PartialEq)]
pub struct Experiment {
    id: ExperimentId,
    cluster_id: ClusterId,
    project_id: ProjectId,
    owner: UserId,
    name: Option<String>,
    description: Option<String>,
    spec_id: Option<SpecId>,
    config: JsonValue,
    original_experiment: Option<ExperimentId>,
    created_at: Timestamp,
    updated_at: Timestamp,
    jobs: Vec<ExperimentJob>,
    history: ExperimentStatusHistory,
}

/// Builder for new experiments.
#[derive(Debug, Clone)]
pub struct ExperimentBuilder {
    id: Option<ExperimentId>,
    cluster_id: ClusterId,
    project_id: ProjectId,
    owner: UserId,
    name: Option<String>,
    description: Option<String>,
    spec_id: Option<SpecId>,
    config: JsonValue,
    original_experiment: Option<ExperimentId>,
    created_at: Option<Timestamp>,
    updated_at: Option<Timestamp>,
}

impl ExperimentBuilder {
    /// Use a caller-chosen id instead of a fresh one.
    pub fn id(mut self, id: ExperimentId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn spec(mut self, spec_id: Option<SpecId>) -> Self {
        self.spec_id = spec_id;
        self
    }

    pub fn config(mut self, config: JsonValue) -> Self {
        self.config = config;
        self
    }

    /// Marks the new experiment as a clone of `original`.
    pub fn clone_of(mut self, original: ExperimentId) -> Self {
        self.original_experiment = Some(original);
        self
    }

    /// Keeps a stored creation time when rebuilding from persistence.
    pub fn created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Keeps a stored modification time; defaults to the creation time.
    pub fn updated_at(mut self, updated_at: Timestamp) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    /// Validates and builds the experiment with no jobs and an empty ledger.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the name is blank or too long
    /// - `LineageCycle` if the experiment names itself as its original
    pub fn build(self) -> Result<Experiment, DomainError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }

        let id = self.id.unwrap_or_default();
        if self.original_experiment == Some(id) {
            return Err(super::lineage::self_reference(id));
        }
        let created_at = self.created_at.unwrap_or_else(Timestamp::now);

        Ok(Experiment {
            id,
            cluster_id: self.cluster_id,
            project_id: self.project_id,
            owner: self.owner,
            name: self.name,
            description: self.description,
            spec_id: self.spec_id,
            config: self.config,
            original_experiment: self.original_experiment,
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at).max(created_at),
            jobs: Vec::new(),
            history: StatusHistory::new(id),
        })
    }
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name", "Name cannot be blank"));
    }
    let length = name.chars().count();
    if length > MAX_NAME_LENGTH {
        return Err(DomainError::validation(
            "name",
            format!("Name must be {} characters or less", MAX_NAME_LENGTH),
        ));
    }
    Ok(())
}

impl Experiment {
    /// Starts building an experiment placed on `cluster_id` within `project_id`.
    pub fn builder(cluster_id: ClusterId, project_id: ProjectId, owner: UserId) -> ExperimentBuilder {
        ExperimentBuilder {
            id: None,
            cluster_id,
            project_id,
            owner,
            name: None,
            description: None,
            spec_id: None,
            config: JsonValue::Object(Default::default()),
            original_experiment: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Attaches stored jobs and ledger events, replacing any already held.
    pub fn with_snapshot(
        mut self,
        jobs: Vec<ExperimentJob>,
        events: Vec<StatusEvent<ExperimentStatus>>,
    ) -> Self {
        self.jobs = jobs;
        self.history = StatusHistory::from_events(self.id, events);
        self
    }

    /// Records a change at `at`. `updated_at` never moves backwards.
    pub fn touch(&mut self, at: Timestamp) {
        self.updated_at = self.updated_at.max(at);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> ExperimentId {
        self.id
    }

    pub fn cluster_id(&self) -> ClusterId {
        self.cluster_id
    }

    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn spec_id(&self) -> Option<SpecId> {
        self.spec_id
    }

    /// Resolved job configuration. Immutable after creation.
    pub fn config(&self) -> &JsonValue {
        &self.config
    }

    pub fn original_experiment(&self) -> Option<ExperimentId> {
        self.original_experiment
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Last time a job or an own status was recorded for this experiment.
    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn jobs(&self) -> &[ExperimentJob] {
        &self.jobs
    }

    pub fn job(&self, id: ExperimentJobId) -> Option<&ExperimentJob> {
        self.jobs.iter().find(|j| j.id() == id)
    }

    /// The experiment's own ledger of orchestration signals.
    pub fn history(&self) -> &ExperimentStatusHistory {
        &self.history
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Derived lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    pub fn is_clone(&self) -> bool {
        self.original_experiment.is_some()
    }

    pub fn is_independent(&self) -> bool {
        self.spec_id.is_none()
    }

    /// Latest status written to the experiment's own ledger.
    pub fn last_status(&self) -> Option<ExperimentStatus> {
        self.history.last_status()
    }

    pub fn is_running(&self) -> bool {
        self.history.is_running()
    }

    pub fn is_done(&self) -> bool {
        self.history.is_done()
    }

    /// Time of the first `starting` signal.
    pub fn started_at(&self) -> Option<Timestamp> {
        self.history.started_at()
    }

    /// Time of the first terminal signal.
    pub fn finished_at(&self) -> Option<Timestamp> {
        self.history.finished_at()
    }

    /// Latest status of every job, in job order.
    pub fn last_job_statuses(&self) -> Vec<(ExperimentJobId, Option<JobStatus>)> {
        self.jobs
            .iter()
            .map(|j| (j.id(), j.last_status()))
            .collect()
    }

    /// Status derived from the jobs' latest statuses. Never stored.
    pub fn calculated_status(&self) -> ExperimentStatus {
        StatusAggregator::calculate(self.jobs.iter().map(|j| j.last_status()))
    }
}
