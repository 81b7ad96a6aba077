//! In-memory implementation of the persistence ports.
//!
//! Each entity lives in a `DashMap` entry. Appends to a ledger happen while
//! holding that entity's entry lock, so concurrent appends to the same job
//! or experiment are serialized while different entities proceed in
//! parallel.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::experiment::{Experiment, ExperimentJob, ExperimentMetric};
use crate::domain::foundation::{DomainError, ErrorCode, ExperimentId, ExperimentJobId, Timestamp};
use crate::domain::lifecycle::{
    ExperimentStatus, ExperimentStatusHistory, JobStatus, JobStatusHistory, LifecycleStatus,
    NewStatusEvent, PostTerminalPolicy, StatusHistory,
};
use crate::ports::{
    AppendedStatus, ExperimentJobRepository, ExperimentRepository, MetricRepository, StatusLedger,
};

struct ExperimentRecord {
    experiment: Experiment,
    job_ids: Vec<ExperimentJobId>,
    history: ExperimentStatusHistory,
}

struct JobRecord {
    job: ExperimentJob,
    history: JobStatusHistory,
}

impl JobRecord {
    fn snapshot(&self) -> ExperimentJob {
        ExperimentJob::reconstitute(
            self.job.id(),
            self.job.experiment_id(),
            self.job.definition().clone(),
            self.job.created_at(),
            self.history.events().to_vec(),
        )
    }
}

/// In-memory store for experiments, jobs, ledgers and metrics.
///
/// Snapshots returned by `find_by_id` read each job ledger atomically;
/// a job appended to concurrently may be seen before or after that append.
pub struct InMemoryExperimentStore {
    experiments: DashMap<ExperimentId, ExperimentRecord>,
    jobs: DashMap<ExperimentJobId, JobRecord>,
    metrics: DashMap<ExperimentId, Vec<ExperimentMetric>>,
    policy: PostTerminalPolicy,
}

impl InMemoryExperimentStore {
    /// Creates an empty store using the default post-terminal policy.
    pub fn new() -> Self {
        Self::with_policy(PostTerminalPolicy::default())
    }

    /// Creates an empty store enforcing `policy` on every ledger.
    pub fn with_policy(policy: PostTerminalPolicy) -> Self {
        Self {
            experiments: DashMap::new(),
            jobs: DashMap::new(),
            metrics: DashMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> PostTerminalPolicy {
        self.policy
    }

    /// Number of stored experiments.
    pub fn experiment_count(&self) -> usize {
        self.experiments.len()
    }

    /// Number of stored jobs.
    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    fn job_snapshots(&self, ids: &[ExperimentJobId]) -> Vec<ExperimentJob> {
        ids.iter()
            .filter_map(|id| self.jobs.get(id).map(|record| record.snapshot()))
            .collect()
    }

    fn append_to<S: LifecycleStatus>(
        history: &mut StatusHistory<S>,
        event: NewStatusEvent<S>,
        policy: PostTerminalPolicy,
    ) -> Result<AppendedStatus<S>, DomainError> {
        let previous = history.latest().map(|e| e.status);
        let event = history.append(event, policy)?.clone();
        Ok(AppendedStatus { event, previous })
    }
}

impl Default for InMemoryExperimentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn experiment_not_found(id: ExperimentId) -> DomainError {
    DomainError::new(
        ErrorCode::ExperimentNotFound,
        format!("Experiment {} not found", id),
    )
    .with_detail("experiment_id", id.to_string())
}

fn job_not_found(id: ExperimentJobId) -> DomainError {
    DomainError::new(
        ErrorCode::ExperimentJobNotFound,
        format!("Experiment job {} not found", id),
    )
    .with_detail("job_id", id.to_string())
}

#[async_trait]
impl ExperimentRepository for InMemoryExperimentStore {
    async fn save(&self, experiment: &Experiment) -> Result<(), DomainError> {
        let id = experiment.id();
        if !experiment.jobs().is_empty() || !experiment.history().is_empty() {
            return Err(DomainError::validation(
                "history",
                format!("Experiment {} must be saved without jobs or status events", id),
            ));
        }
        match self.experiments.entry(id) {
            Entry::Occupied(_) => Err(DomainError::validation(
                "id",
                format!("Experiment {} already exists", id),
            )),
            Entry::Vacant(slot) => {
                slot.insert(ExperimentRecord {
                    experiment: experiment.clone(),
                    job_ids: Vec::new(),
                    history: StatusHistory::new(id),
                });
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: ExperimentId) -> Result<Option<Experiment>, DomainError> {
        let (experiment, job_ids, events) = match self.experiments.get(&id) {
            Some(record) => (
                record.experiment.clone(),
                record.job_ids.clone(),
                record.history.events().to_vec(),
            ),
            None => return Ok(None),
        };
        let jobs = self.job_snapshots(&job_ids);
        Ok(Some(experiment.with_snapshot(jobs, events)))
    }

    async fn exists(&self, id: ExperimentId) -> Result<bool, DomainError> {
        Ok(self.experiments.contains_key(&id))
    }

    async fn original_of(&self, id: ExperimentId) -> Result<Option<ExperimentId>, DomainError> {
        self.experiments
            .get(&id)
            .map(|record| record.experiment.original_experiment())
            .ok_or_else(|| experiment_not_found(id))
    }

    async fn find_clones(&self, original: ExperimentId) -> Result<Vec<Experiment>, DomainError> {
        let mut clone_ids: Vec<(ExperimentId, Timestamp)> = self
            .experiments
            .iter()
            .filter(|entry| entry.experiment.original_experiment() == Some(original))
            .map(|entry| (*entry.key(), entry.experiment.created_at()))
            .collect();
        clone_ids.sort_by_key(|(id, created_at)| (*created_at, *id));

        let mut clones = Vec::with_capacity(clone_ids.len());
        for (id, _) in clone_ids {
            if let Some(experiment) = ExperimentRepository::find_by_id(self, id).await? {
                clones.push(experiment);
            }
        }
        Ok(clones)
    }

    async fn delete(&self, id: ExperimentId) -> Result<(), DomainError> {
        let (_, record) = self
            .experiments
            .remove(&id)
            .ok_or_else(|| experiment_not_found(id))?;
        for job_id in &record.job_ids {
            self.jobs.remove(job_id);
        }
        self.metrics.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl ExperimentJobRepository for InMemoryExperimentStore {
    async fn save(&self, job: &ExperimentJob) -> Result<(), DomainError> {
        if !job.history().is_empty() {
            return Err(DomainError::validation(
                "history",
                format!("Experiment job {} must be saved with an empty ledger", job.id()),
            ));
        }

        let mut parent = self
            .experiments
            .get_mut(&job.experiment_id())
            .ok_or_else(|| experiment_not_found(job.experiment_id()))?;

        let id = job.id();
        if self.jobs.contains_key(&id) {
            return Err(DomainError::validation(
                "id",
                format!("Experiment job {} already exists", id),
            ));
        }

        self.jobs.insert(
            id,
            JobRecord {
                job: ExperimentJob::reconstitute(
                    id,
                    job.experiment_id(),
                    job.definition().clone(),
                    job.created_at(),
                    Vec::new(),
                ),
                history: StatusHistory::new(id),
            },
        );
        parent.job_ids.push(id);
        parent.experiment.touch(job.created_at());
        Ok(())
    }

    async fn find_by_id(&self, id: ExperimentJobId) -> Result<Option<ExperimentJob>, DomainError> {
        Ok(self.jobs.get(&id).map(|record| record.snapshot()))
    }

    async fn find_by_experiment_id(
        &self,
        experiment_id: ExperimentId,
    ) -> Result<Vec<ExperimentJob>, DomainError> {
        let job_ids = match self.experiments.get(&experiment_id) {
            Some(record) => record.job_ids.clone(),
            None => return Ok(Vec::new()),
        };
        Ok(self.job_snapshots(&job_ids))
    }
}

#[async_trait]
impl StatusLedger for InMemoryExperimentStore {
    async fn append_job_status(
        &self,
        job_id: ExperimentJobId,
        event: NewStatusEvent<JobStatus>,
    ) -> Result<AppendedStatus<JobStatus>, DomainError> {
        let mut record = self
            .jobs
            .get_mut(&job_id)
            .ok_or_else(|| job_not_found(job_id))?;
        Self::append_to(&mut record.history, event, self.policy)
    }

    async fn job_history(&self, job_id: ExperimentJobId) -> Result<JobStatusHistory, DomainError> {
        self.jobs
            .get(&job_id)
            .map(|record| record.history.clone())
            .ok_or_else(|| job_not_found(job_id))
    }

    async fn append_experiment_status(
        &self,
        experiment_id: ExperimentId,
        event: NewStatusEvent<ExperimentStatus>,
    ) -> Result<AppendedStatus<ExperimentStatus>, DomainError> {
        let mut record = self
            .experiments
            .get_mut(&experiment_id)
            .ok_or_else(|| experiment_not_found(experiment_id))?;
        let appended = Self::append_to(&mut record.history, event, self.policy)?;
        record.experiment.touch(appended.event.created_at);
        Ok(appended)
    }

    async fn experiment_history(
        &self,
        experiment_id: ExperimentId,
    ) -> Result<ExperimentStatusHistory, DomainError> {
        self.experiments
            .get(&experiment_id)
            .map(|record| record.history.clone())
            .ok_or_else(|| experiment_not_found(experiment_id))
    }

    async fn latest_job_statuses(
        &self,
        experiment_id: ExperimentId,
    ) -> Result<Vec<(ExperimentJobId, Option<JobStatus>)>, DomainError> {
        let job_ids = self
            .experiments
            .get(&experiment_id)
            .map(|record| record.job_ids.clone())
            .ok_or_else(|| experiment_not_found(experiment_id))?;

        Ok(job_ids
            .into_iter()
            .filter_map(|id| {
                self.jobs
                    .get(&id)
                    .map(|record| (id, record.history.latest().map(|e| e.status)))
            })
            .collect())
    }
}

#[async_trait]
impl MetricRepository for InMemoryExperimentStore {
    async fn append(&self, metric: &ExperimentMetric) -> Result<(), DomainError> {
        let experiment_id = metric.experiment_id();
        // held until the push so a concurrent delete cannot strand the metric
        let _parent = self
            .experiments
            .get(&experiment_id)
            .ok_or_else(|| experiment_not_found(experiment_id))?;
        self.metrics
            .entry(experiment_id)
            .or_default()
            .push(metric.clone());
        Ok(())
    }

    async fn find_by_experiment_id(
        &self,
        experiment_id: ExperimentId,
    ) -> Result<Vec<ExperimentMetric>, DomainError> {
        let mut metrics = self
            .metrics
            .get(&experiment_id)
            .map(|m| m.value().clone())
            .unwrap_or_default();
        metrics.sort_by_key(|m| m.created_at());
        Ok(metrics)
    }
}
