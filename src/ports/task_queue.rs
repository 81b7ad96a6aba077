//! Task queue ports.
//!
//! The queue transport is external. This crate only enqueues named tasks
//! carrying an experiment id, and runs handlers for the tasks it owns.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ExperimentId, TaskId};
use crate::domain::scheduling::{ExperimentTaskPayload, TaskName};

/// Port for enqueueing tasks.
///
/// Delivery is asynchronous and at-least-once, with no ordering between
/// separate enqueues. Callers never wait for the task to run.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Enqueue a task and return its id.
    ///
    /// # Errors
    ///
    /// - `QueueUnavailable` if nothing was enqueued
    async fn enqueue(
        &self,
        name: TaskName,
        payload: ExperimentTaskPayload,
    ) -> Result<TaskId, DomainError>;
}

/// Failure reported to the task framework.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Task '{task}' failed for experiment {experiment_id}: {reason}")]
pub struct OperationError {
    pub task: TaskName,
    pub experiment_id: ExperimentId,
    pub reason: String,
    /// Whether running the task again could succeed.
    pub retryable: bool,
}

impl OperationError {
    /// A failure that retrying cannot fix.
    pub fn permanent(task: TaskName, experiment_id: ExperimentId, reason: impl Into<String>) -> Self {
        Self {
            task,
            experiment_id,
            reason: reason.into(),
            retryable: false,
        }
    }

    /// A failure that may clear up on retry.
    pub fn transient(task: TaskName, experiment_id: ExperimentId, reason: impl Into<String>) -> Self {
        Self {
            task,
            experiment_id,
            reason: reason.into(),
            retryable: true,
        }
    }
}

/// Runs one kind of task.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    /// The task this handler runs.
    fn task_name(&self) -> TaskName;

    /// Run the task for one payload.
    async fn run(&self, payload: ExperimentTaskPayload) -> Result<(), OperationError>;
}
