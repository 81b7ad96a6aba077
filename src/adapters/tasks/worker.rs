//! TaskWorker - Background service that runs queued tasks.
//!
//! Pulls `TaskRequest`s from a channel queue and dispatches each one to the
//! `TaskHandler` registered for its name.
//!
//! ## Concurrency
//!
//! At most `concurrency` tasks run at once; further requests wait for a
//! permit before they are spawned.
//!
//! ## Graceful Shutdown
//!
//! The worker listens on a `watch` channel. Once shutdown is signalled it
//! stops taking new requests and waits for in-flight tasks to finish.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, watch, Semaphore};
use tokio::task::JoinSet;

use crate::domain::scheduling::{TaskName, TaskRequest};
use crate::ports::TaskHandler;

/// What happened to one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Succeeded,
    Failed { retryable: bool, reason: String },
    /// No handler is registered for the task's name.
    Unhandled,
}

/// Counts of task outcomes over a worker run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub succeeded: usize,
    pub failed: usize,
    pub unhandled: usize,
}

impl WorkerReport {
    fn record(&mut self, outcome: &TaskOutcome) {
        match outcome {
            TaskOutcome::Succeeded => self.succeeded += 1,
            TaskOutcome::Failed { .. } => self.failed += 1,
            TaskOutcome::Unhandled => self.unhandled += 1,
        }
    }

    /// Total number of tasks taken off the queue.
    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.unhandled
    }
}

/// Runs tasks from a queue with bounded concurrency.
pub struct TaskWorker {
    handlers: HashMap<TaskName, Arc<dyn TaskHandler>>,
    permits: Arc<Semaphore>,
}

impl TaskWorker {
    /// Creates a worker running at most `concurrency` tasks at once.
    pub fn new(concurrency: usize) -> Self {
        Self {
            handlers: HashMap::new(),
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
        }
    }

    /// Registers a handler under its task name, replacing any earlier one.
    pub fn register(mut self, handler: Arc<dyn TaskHandler>) -> Self {
        self.handlers.insert(handler.task_name(), handler);
        self
    }

    pub fn handles(&self, name: TaskName) -> bool {
        self.handlers.contains_key(&name)
    }

    /// Run one task inline and report its outcome.
    pub async fn process(&self, request: TaskRequest) -> TaskOutcome {
        Self::execute(self.handlers.get(&request.name).cloned(), request).await
    }

    /// Run the worker loop until shutdown is signalled or the queue closes.
    ///
    /// # Arguments
    ///
    /// * `tasks` - Receiving half of a `ChannelTaskQueue`
    /// * `shutdown` - Watch channel that signals when to stop
    pub async fn run(
        &self,
        mut tasks: mpsc::Receiver<TaskRequest>,
        mut shutdown: watch::Receiver<bool>,
    ) -> WorkerReport {
        let mut report = WorkerReport::default();
        let mut in_flight: JoinSet<TaskOutcome> = JoinSet::new();

        tracing::info!(
            handlers = self.handlers.len(),
            concurrency = self.permits.available_permits(),
            "task worker started"
        );

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }

                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    report.record(&Self::joined_outcome(joined));
                }

                next = tasks.recv() => {
                    let Some(request) = next else { break };
                    let permit = match Arc::clone(&self.permits).acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => break,
                    };
                    let handler = self.handlers.get(&request.name).cloned();
                    in_flight.spawn(async move {
                        let _permit = permit; // Hold until complete
                        Self::execute(handler, request).await
                    });
                }
            }
        }

        tracing::info!(in_flight = in_flight.len(), "task worker draining");
        while let Some(joined) = in_flight.join_next().await {
            report.record(&Self::joined_outcome(joined));
        }

        tracing::info!(
            succeeded = report.succeeded,
            failed = report.failed,
            unhandled = report.unhandled,
            "task worker stopped"
        );
        report
    }

    async fn execute(handler: Option<Arc<dyn TaskHandler>>, request: TaskRequest) -> TaskOutcome {
        let Some(handler) = handler else {
            tracing::warn!(
                task = %request.name,
                task_id = %request.task_id,
                "no handler registered for task"
            );
            return TaskOutcome::Unhandled;
        };

        match handler.run(request.payload).await {
            Ok(()) => {
                tracing::info!(
                    task = %request.name,
                    task_id = %request.task_id,
                    experiment_id = %request.experiment_id(),
                    "task succeeded"
                );
                TaskOutcome::Succeeded
            }
            Err(e) => {
                tracing::warn!(
                    task = %request.name,
                    task_id = %request.task_id,
                    experiment_id = %request.experiment_id(),
                    retryable = e.retryable,
                    error = %e,
                    "task failed"
                );
                TaskOutcome::Failed {
                    retryable: e.retryable,
                    reason: e.reason,
                }
            }
        }
    }

    fn joined_outcome(joined: Result<TaskOutcome, tokio::task::JoinError>) -> TaskOutcome {
        joined.unwrap_or_else(|e| {
            tracing::error!(error = %e, "task panicked or was cancelled");
            TaskOutcome::Failed {
                retryable: true,
                reason: e.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::tasks::ChannelTaskQueue;
    use crate::domain::foundation::ExperimentId;
    use crate::domain::scheduling::ExperimentTaskPayload;
    use crate::ports::{OperationError, TaskQueue};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingHandler {
        name: TaskName,
        runs: AtomicUsize,
        running: AtomicUsize,
        max_running: AtomicUsize,
    }

    impl CountingHandler {
        fn new(name: TaskName) -> Self {
            Self {
                name,
                runs: AtomicUsize::new(0),
                running: AtomicUsize::new(0),
                max_running: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TaskHandler for CountingHandler {
        fn task_name(&self) -> TaskName {
            self.name
        }

        async fn run(&self, _payload: ExperimentTaskPayload) -> Result<(), OperationError> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_running.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.running.fetch_sub(1, Ordering::SeqCst);
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct RejectingHandler;

    #[async_trait]
    impl TaskHandler for RejectingHandler {
        fn task_name(&self) -> TaskName {
            TaskName::ScheduleExperiment
        }

        async fn run(&self, payload: ExperimentTaskPayload) -> Result<(), OperationError> {
            Err(OperationError::permanent(
                TaskName::ScheduleExperiment,
                payload.experiment_id,
                "no longer exists",
            ))
        }
    }

    fn request(name: TaskName) -> TaskRequest {
        TaskRequest::new(name, ExperimentId::new())
    }

    #[tokio::test]
    async fn process_reports_success() {
        let handler = Arc::new(CountingHandler::new(TaskName::BuildExperiment));
        let worker = TaskWorker::new(1).register(handler.clone());

        let outcome = worker.process(request(TaskName::BuildExperiment)).await;

        assert_eq!(outcome, TaskOutcome::Succeeded);
        assert_eq!(handler.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn process_reports_non_retryable_failure() {
        let worker = TaskWorker::new(1).register(Arc::new(RejectingHandler));

        let outcome = worker.process(request(TaskName::ScheduleExperiment)).await;

        assert_eq!(
            outcome,
            TaskOutcome::Failed {
                retryable: false,
                reason: "no longer exists".to_string()
            }
        );
    }

    #[tokio::test]
    async fn process_reports_unhandled_task() {
        let worker = TaskWorker::new(1).register(Arc::new(RejectingHandler));

        assert!(!worker.handles(TaskName::BuildExperiment));
        assert_eq!(
            worker.process(request(TaskName::BuildExperiment)).await,
            TaskOutcome::Unhandled
        );
    }

    #[tokio::test]
    async fn run_drains_queue_within_concurrency_limit() {
        let handler = Arc::new(CountingHandler::new(TaskName::BuildExperiment));
        let worker = TaskWorker::new(2).register(handler.clone());
        let (queue, receiver) = ChannelTaskQueue::channel(16);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        for _ in 0..6 {
            queue
                .enqueue(
                    TaskName::BuildExperiment,
                    ExperimentTaskPayload {
                        experiment_id: ExperimentId::new(),
                    },
                )
                .await
                .unwrap();
        }
        drop(queue);

        let report = worker.run(receiver, shutdown_rx).await;

        assert_eq!(report.succeeded, 6);
        assert_eq!(report.total(), 6);
        assert!(handler.max_running.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn run_stops_on_shutdown_signal() {
        let worker = TaskWorker::new(1);
        let (_queue, receiver) = ChannelTaskQueue::channel(4);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let stopper = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            shutdown_tx.send(true).ok();
            shutdown_tx
        });

        let report = worker.run(receiver, shutdown_rx).await;
        let _ = stopper.await;

        assert_eq!(report, WorkerReport::default());
    }
}
