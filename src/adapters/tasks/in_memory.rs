//! In-memory task queue that records what was enqueued.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::domain::foundation::{DomainError, ErrorCode, TaskId};
use crate::domain::scheduling::{ExperimentTaskPayload, TaskName, TaskRequest};
use crate::ports::TaskQueue;

/// Task queue that keeps every enqueued request in memory.
///
/// Nothing consumes the recorded requests; use it where only the enqueue
/// side matters. Can be switched to refuse enqueues.
#[derive(Default)]
pub struct InMemoryTaskQueue {
    enqueued: Mutex<Vec<TaskRequest>>,
    unavailable: AtomicBool,
}

impl InMemoryTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// A queue that refuses every enqueue.
    pub fn unavailable() -> Self {
        let queue = Self::new();
        queue.set_available(false);
        queue
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Every request enqueued so far, oldest first.
    pub fn enqueued(&self) -> Vec<TaskRequest> {
        self.enqueued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn enqueued_count(&self) -> usize {
        self.enqueued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Requests enqueued under `name`.
    pub fn enqueued_named(&self, name: TaskName) -> Vec<TaskRequest> {
        self.enqueued()
            .into_iter()
            .filter(|r| r.name == name)
            .collect()
    }
}

#[async_trait]
impl TaskQueue for InMemoryTaskQueue {
    async fn enqueue(
        &self,
        name: TaskName,
        payload: ExperimentTaskPayload,
    ) -> Result<TaskId, DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::QueueUnavailable,
                "Task queue is unavailable",
            )
            .with_detail("task", name.as_str()));
        }

        let request = TaskRequest::new(name, payload.experiment_id);
        let task_id = request.task_id;
        self.enqueued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        Ok(task_id)
    }
}
