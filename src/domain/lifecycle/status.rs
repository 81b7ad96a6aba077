//! Status enumerations for each entity kind.
//!
//! The labels returned by `label()` are the wire contract with the execution
//! backend. Classification and precedence live in the registry tables, not
//! on these enums.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use crate::domain::foundation::{ExperimentId, ExperimentJobId, ValidationError};

use super::registry::{experiment_registry, job_registry, LifecycleRegistry};

/// The kinds of entity that own a status ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Experiment,
    ExperimentJob,
}

impl EntityKind {
    /// Returns the kind name used on notification envelopes.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Experiment => "Experiment",
            EntityKind::ExperimentJob => "ExperimentJob",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status label belonging to one entity kind.
///
/// Ties the status enum to the entity identifier type whose ledger it
/// appears in, and to the registry that classifies it.
pub trait LifecycleStatus:
    Copy + Eq + Hash + fmt::Debug + fmt::Display + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Identifier of the entity owning a ledger of this status type.
    type EntityId: Copy
        + Eq
        + Hash
        + fmt::Debug
        + fmt::Display
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    /// Entity kind these statuses describe.
    const KIND: EntityKind;

    /// Wire label for this status.
    fn label(&self) -> &'static str;

    /// Classification and precedence table for this kind.
    fn registry() -> &'static LifecycleRegistry<Self>;
}

/// Status labels reported for an experiment job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Created,
    Building,
    Scheduled,
    Running,
    Succeeded,
    Failed,
    Stopped,
    Unknown,
}

impl JobStatus {
    /// Every job status, in lifecycle order.
    pub const ALL: [JobStatus; 8] = [
        JobStatus::Created,
        JobStatus::Building,
        JobStatus::Scheduled,
        JobStatus::Running,
        JobStatus::Succeeded,
        JobStatus::Failed,
        JobStatus::Stopped,
        JobStatus::Unknown,
    ];
}

impl LifecycleStatus for JobStatus {
    type EntityId = ExperimentJobId;

    const KIND: EntityKind = EntityKind::ExperimentJob;

    fn label(&self) -> &'static str {
        match self {
            JobStatus::Created => "created",
            JobStatus::Building => "building",
            JobStatus::Scheduled => "scheduled",
            JobStatus::Running => "running",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
            JobStatus::Stopped => "stopped",
            JobStatus::Unknown => "unknown",
        }
    }

    fn registry() -> &'static LifecycleRegistry<Self> {
        job_registry()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for JobStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::registry().parse(s)
    }
}

/// Status labels recorded for an experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentStatus {
    Created,
    Building,
    Scheduled,
    Starting,
    Running,
    Succeeded,
    Failed,
    Stopped,
    Unknown,
}

impl ExperimentStatus {
    /// Every experiment status, in lifecycle order.
    pub const ALL: [ExperimentStatus; 9] = [
        ExperimentStatus::Created,
        ExperimentStatus::Building,
        ExperimentStatus::Scheduled,
        ExperimentStatus::Starting,
        ExperimentStatus::Running,
        ExperimentStatus::Succeeded,
        ExperimentStatus::Failed,
        ExperimentStatus::Stopped,
        ExperimentStatus::Unknown,
    ];
}

impl LifecycleStatus for ExperimentStatus {
    type EntityId = ExperimentId;

    const KIND: EntityKind = EntityKind::Experiment;

    fn label(&self) -> &'static str {
        match self {
            ExperimentStatus::Created => "created",
            ExperimentStatus::Building => "building",
            ExperimentStatus::Scheduled => "scheduled",
            ExperimentStatus::Starting => "starting",
            ExperimentStatus::Running => "running",
            ExperimentStatus::Succeeded => "succeeded",
            ExperimentStatus::Failed => "failed",
            ExperimentStatus::Stopped => "stopped",
            ExperimentStatus::Unknown => "unknown",
        }
    }

    fn registry() -> &'static LifecycleRegistry<Self> {
        experiment_registry()
    }
}

impl fmt::Display for ExperimentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExperimentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::registry().parse(s)
    }
}

/// A job status seen from the experiment's point of view.
impl From<JobStatus> for ExperimentStatus {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Created => ExperimentStatus::Created,
            JobStatus::Building => ExperimentStatus::Building,
            JobStatus::Scheduled => ExperimentStatus::Scheduled,
            JobStatus::Running => ExperimentStatus::Running,
            JobStatus::Succeeded => ExperimentStatus::Succeeded,
            JobStatus::Failed => ExperimentStatus::Failed,
            JobStatus::Stopped => ExperimentStatus::Stopped,
            JobStatus::Unknown => ExperimentStatus::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_status_serializes_to_label() {
        for status in JobStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.label()));
        }
    }

    #[test]
    fn experiment_status_serializes_to_label() {
        for status in ExperimentStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.label()));
        }
    }

    #[test]
    fn from_str_accepts_known_labels() {
        assert_eq!("running".parse::<JobStatus>(), Ok(JobStatus::Running));
        assert_eq!(
            "starting".parse::<ExperimentStatus>(),
            Ok(ExperimentStatus::Starting)
        );
    }

    #[test]
    fn from_str_rejects_label_of_other_kind() {
        // "starting" is an experiment-only label
        let err = "starting".parse::<JobStatus>().unwrap_err();
        assert_eq!(err, ValidationError::unknown_status("ExperimentJob", "starting"));
    }

    #[test]
    fn job_status_maps_to_same_named_experiment_status() {
        for status in JobStatus::ALL {
            assert_eq!(ExperimentStatus::from(status).label(), status.label());
        }
    }

    #[test]
    fn entity_kind_displays_name() {
        assert_eq!(EntityKind::Experiment.to_string(), "Experiment");
        assert_eq!(JobStatus::KIND.to_string(), "ExperimentJob");
    }
}
