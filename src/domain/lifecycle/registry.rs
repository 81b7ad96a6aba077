//! Status classification and precedence tables.
//!
//! One table per entity kind, built once at first use. Every status maps to
//! exactly one [`Phase`] and carries a rank used by the aggregator: higher
//! rank wins. Adding a status means adding one row here.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

use super::status::{EntityKind, ExperimentStatus, JobStatus, LifecycleStatus};

/// Lifecycle classification of a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    NotStarted,
    Running,
    Done,
}

#[derive(Debug, Clone, Copy)]
struct Entry<S> {
    status: S,
    phase: Phase,
    rank: u8,
}

/// Immutable policy table for one entity kind.
#[derive(Debug)]
pub struct LifecycleRegistry<S> {
    kind: EntityKind,
    default_status: S,
    entries: Vec<Entry<S>>,
}

/// Builder for [`LifecycleRegistry`]. Rows keep insertion order.
pub struct LifecycleRegistryBuilder<S> {
    kind: EntityKind,
    default_status: S,
    entries: Vec<Entry<S>>,
}

impl<S: LifecycleStatus> LifecycleRegistryBuilder<S> {
    /// Adds a status row. A repeated status replaces the earlier row.
    pub fn status(mut self, status: S, phase: Phase, rank: u8) -> Self {
        self.entries.retain(|e| e.status != status);
        self.entries.push(Entry {
            status,
            phase,
            rank,
        });
        self
    }

    pub fn build(self) -> LifecycleRegistry<S> {
        LifecycleRegistry {
            kind: self.kind,
            default_status: self.default_status,
            entries: self.entries,
        }
    }
}

impl<S: LifecycleStatus> LifecycleRegistry<S> {
    /// Starts a table for `kind` whose empty-aggregate status is `default_status`.
    pub fn builder(kind: EntityKind, default_status: S) -> LifecycleRegistryBuilder<S> {
        LifecycleRegistryBuilder {
            kind,
            default_status,
            entries: Vec::new(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Status used when there is nothing to aggregate.
    pub fn default_status(&self) -> S {
        self.default_status
    }

    /// All valid statuses, in table order.
    pub fn statuses(&self) -> Vec<S> {
        self.entries.iter().map(|e| e.status).collect()
    }

    pub fn contains(&self, status: S) -> bool {
        self.entry(status).is_some()
    }

    pub fn phase(&self, status: S) -> Option<Phase> {
        self.entry(status).map(|e| e.phase)
    }

    pub fn rank(&self, status: S) -> Option<u8> {
        self.entry(status).map(|e| e.rank)
    }

    /// Statuses classified as running.
    pub fn running(&self) -> Vec<S> {
        self.in_phase(Phase::Running)
    }

    /// Statuses classified as done (terminal).
    pub fn done(&self) -> Vec<S> {
        self.in_phase(Phase::Done)
    }

    pub fn is_running(&self, status: S) -> bool {
        self.phase(status) == Some(Phase::Running)
    }

    pub fn is_done(&self, status: S) -> bool {
        self.phase(status) == Some(Phase::Done)
    }

    /// Parses a wire label into a status of this kind.
    pub fn parse(&self, label: &str) -> Result<S, ValidationError> {
        self.entries
            .iter()
            .map(|e| e.status)
            .find(|s| s.label() == label)
            .ok_or_else(|| ValidationError::unknown_status(self.kind, label))
    }

    fn in_phase(&self, phase: Phase) -> Vec<S> {
        self.entries
            .iter()
            .filter(|e| e.phase == phase)
            .map(|e| e.status)
            .collect()
    }

    fn entry(&self, status: S) -> Option<&Entry<S>> {
        self.entries.iter().find(|e| e.status == status)
    }
}

static JOB_REGISTRY: Lazy<LifecycleRegistry<JobStatus>> = Lazy::new(|| {
    LifecycleRegistry::builder(EntityKind::ExperimentJob, JobStatus::Created)
        .status(JobStatus::Created, Phase::NotStarted, 5)
        .status(JobStatus::Building, Phase::Running, 6)
        .status(JobStatus::Scheduled, Phase::Running, 7)
        .status(JobStatus::Running, Phase::Running, 8)
        .status(JobStatus::Succeeded, Phase::Done, 1)
        .status(JobStatus::Failed, Phase::Done, 3)
        .status(JobStatus::Stopped, Phase::Done, 2)
        .status(JobStatus::Unknown, Phase::NotStarted, 4)
        .build()
});

static EXPERIMENT_REGISTRY: Lazy<LifecycleRegistry<ExperimentStatus>> = Lazy::new(|| {
    LifecycleRegistry::builder(EntityKind::Experiment, ExperimentStatus::Created)
        .status(ExperimentStatus::Created, Phase::NotStarted, 5)
        .status(ExperimentStatus::Building, Phase::Running, 6)
        .status(ExperimentStatus::Scheduled, Phase::Running, 7)
        .status(ExperimentStatus::Starting, Phase::Running, 8)
        .status(ExperimentStatus::Running, Phase::Running, 9)
        .status(ExperimentStatus::Succeeded, Phase::Done, 1)
        .status(ExperimentStatus::Failed, Phase::Done, 3)
        .status(ExperimentStatus::Stopped, Phase::Done, 2)
        .status(ExperimentStatus::Unknown, Phase::NotStarted, 4)
        .build()
});

/// Table for [`JobStatus`].
pub fn job_registry() -> &'static LifecycleRegistry<JobStatus> {
    &JOB_REGISTRY
}

/// Table for [`ExperimentStatus`].
pub fn experiment_registry() -> &'static LifecycleRegistry<ExperimentStatus> {
    &EXPERIMENT_REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn assert_table_is_total<S: LifecycleStatus>(all: &[S]) {
        let registry = S::registry();
        assert_eq!(registry.statuses().len(), all.len());
        for status in all {
            assert!(registry.contains(*status), "{status} missing");
            let phases = [Phase::NotStarted, Phase::Running, Phase::Done]
                .iter()
                .filter(|p| registry.phase(*status) == Some(**p))
                .count();
            assert_eq!(phases, 1);
        }
        let ranks: HashSet<u8> = all.iter().filter_map(|s| registry.rank(*s)).collect();
        assert_eq!(ranks.len(), all.len(), "ranks must be distinct");
        assert!(registry.contains(registry.default_status()));
    }

    #[test]
    fn job_table_is_total_and_disjoint() {
        assert_table_is_total(&JobStatus::ALL);
    }

    #[test]
    fn experiment_table_is_total_and_disjoint() {
        assert_table_is_total(&ExperimentStatus::ALL);
    }

    #[test]
    fn done_sets_match_terminal_labels() {
        assert_eq!(
            job_registry().done(),
            vec![JobStatus::Succeeded, JobStatus::Failed, JobStatus::Stopped]
        );
        assert_eq!(
            experiment_registry().done(),
            vec![
                ExperimentStatus::Succeeded,
                ExperimentStatus::Failed,
                ExperimentStatus::Stopped
            ]
        );
    }

    #[test]
    fn starting_is_running_only_for_experiments() {
        assert!(experiment_registry().is_running(ExperimentStatus::Starting));
        assert!(experiment_registry()
            .running()
            .contains(&ExperimentStatus::Starting));
        assert_eq!(job_registry().running().len(), 3);
    }

    #[test]
    fn failed_outranks_stopped_outranks_succeeded() {
        let r = experiment_registry();
        assert!(r.rank(ExperimentStatus::Failed) > r.rank(ExperimentStatus::Stopped));
        assert!(r.rank(ExperimentStatus::Stopped) > r.rank(ExperimentStatus::Succeeded));
        assert!(r.rank(ExperimentStatus::Building) > r.rank(ExperimentStatus::Failed));
    }

    #[test]
    fn parse_rejects_unknown_label() {
        let err = job_registry().parse("exploded").unwrap_err();
        assert!(matches!(err, ValidationError::UnknownStatus { ref label, .. } if label == "exploded"));
    }

    #[test]
    fn builder_replaces_repeated_status() {
        let registry = LifecycleRegistry::builder(EntityKind::ExperimentJob, JobStatus::Created)
            .status(JobStatus::Created, Phase::NotStarted, 1)
            .status(JobStatus::Created, Phase::Running, 2)
            .build();
        assert_eq!(registry.statuses(), vec![JobStatus::Created]);
        assert_eq!(registry.phase(JobStatus::Created), Some(Phase::Running));
    }

    proptest! {
        #[test]
        fn job_labels_parse_back(index in 0usize..JobStatus::ALL.len()) {
            let status = JobStatus::ALL[index];
            prop_assert_eq!(job_registry().parse(status.label()), Ok(status));
        }

        #[test]
        fn experiment_labels_parse_back(index in 0usize..ExperimentStatus::ALL.len()) {
            let status = ExperimentStatus::ALL[index];
            prop_assert_eq!(experiment_registry().parse(status.label()), Ok(status));
        }

        #[test]
        fn running_and_done_never_overlap(index in 0usize..ExperimentStatus::ALL.len()) {
            let status = ExperimentStatus::ALL[index];
            let r = experiment_registry();
            prop_assert!(!(r.is_running(status) && r.is_done(status)));
        }
    }
}
