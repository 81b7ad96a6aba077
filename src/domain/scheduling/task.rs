//! Task-queue messages.
//!
//! Tasks carry only the experiment id. Whoever runs a task re-reads the
//! experiment, so a queued task can never act on a stale copy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{ExperimentId, TaskId, Timestamp, ValidationError};

/// Names of the tasks this crate enqueues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskName {
    /// Validate an experiment and dispatch its build.
    #[serde(rename = "experiments.schedule")]
    ScheduleExperiment,
    /// Build an experiment's jobs. Runs outside this crate.
    #[serde(rename = "experiments.build")]
    BuildExperiment,
}

impl TaskName {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskName::ScheduleExperiment => "experiments.schedule",
            TaskName::BuildExperiment => "experiments.build",
        }
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "experiments.schedule" => Ok(TaskName::ScheduleExperiment),
            "experiments.build" => Ok(TaskName::BuildExperiment),
            other => Err(ValidationError::invalid_format(
                "task_name",
                format!("unknown task '{}'", other),
            )),
        }
    }
}

/// Payload of every experiment task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentTaskPayload {
    pub experiment_id: ExperimentId,
}

/// A task as it sits on the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRequest {
    pub task_id: TaskId,
    pub name: TaskName,
    pub payload: ExperimentTaskPayload,
    pub enqueued_at: Timestamp,
}

impl TaskRequest {
    pub fn new(name: TaskName, experiment_id: ExperimentId) -> Self {
        Self {
            task_id: TaskId::new(),
            name,
            payload: ExperimentTaskPayload { experiment_id },
            enqueued_at: Timestamp::now(),
        }
    }

    pub fn experiment_id(&self) -> ExperimentId {
        self.payload.experiment_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn task_names_use_dotted_wire_form() {
        assert_eq!(
            serde_json::to_value(TaskName::BuildExperiment).unwrap(),
            json!("experiments.build")
        );
        assert_eq!(
            "experiments.schedule".parse::<TaskName>(),
            Ok(TaskName::ScheduleExperiment)
        );
        assert!("experiments.delete".parse::<TaskName>().is_err());
    }

    #[test]
    fn payload_is_only_the_experiment_id() {
        let id = ExperimentId::new();
        let request = TaskRequest::new(TaskName::BuildExperiment, id);

        let payload = serde_json::to_value(request.payload).unwrap();

        assert_eq!(payload, json!({ "experiment_id": id.to_string() }));
        assert_eq!(request.experiment_id(), id);
    }
}
