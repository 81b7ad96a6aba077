//! Task queue backed by a bounded tokio channel.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::domain::foundation::{DomainError, ErrorCode, TaskId};
use crate::domain::scheduling::{ExperimentTaskPayload, TaskName, TaskRequest};
use crate::ports::TaskQueue;

/// Sending half of an in-process task queue.
///
/// Enqueue never waits for capacity: a full queue is reported as
/// `QueueUnavailable` so a handler running on the worker cannot block the
/// worker that would drain it.
#[derive(Clone)]
pub struct ChannelTaskQueue {
    sender: mpsc::Sender<TaskRequest>,
}

impl ChannelTaskQueue {
    /// Creates a queue holding at most `capacity` pending tasks, and the
    /// receiver a `TaskWorker` consumes.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<TaskRequest>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Number of tasks that can still be enqueued.
    pub fn remaining_capacity(&self) -> usize {
        self.sender.capacity()
    }
}

#[async_trait]
impl TaskQueue for ChannelTaskQueue {
    async fn enqueue(
        &self,
        name: TaskName,
        payload: ExperimentTaskPayload,
    ) -> Result<TaskId, DomainError> {
        let request = TaskRequest::new(name, payload.experiment_id);
        let task_id = request.task_id;

        match self.sender.try_send(request) {
            Ok(()) => {
                tracing::debug!(task = %name, %task_id, experiment_id = %payload.experiment_id, "task enqueued");
                Ok(task_id)
            }
            Err(TrySendError::Full(_)) => Err(DomainError::new(
                ErrorCode::QueueUnavailable,
                "Task queue is full",
            )
            .with_detail("task", name.as_str())),
            Err(TrySendError::Closed(_)) => Err(DomainError::new(
                ErrorCode::QueueUnavailable,
                "Task queue is closed",
            )
            .with_detail("task", name.as_str())),
        }
    }
}
