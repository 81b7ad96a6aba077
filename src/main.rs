//! # experiment-lifecycle
//!
//! Worker process for experiment scheduling.
//!
//! Wires the in-memory store, the in-process notification bus and a bounded
//! task channel, then runs a `TaskWorker` until Ctrl+C. In-flight tasks are
//! drained before exit.
//!
//! ## Configuration
//!
//! Read from `EXPERIMENT_LIFECYCLE__*` environment variables (and `.env`);
//! see [`experiment_lifecycle::config::AppConfig`].

use std::sync::Arc;

use tokio::sync::watch;

use experiment_lifecycle::adapters::{
    ChannelTaskQueue, InMemoryExperimentStore, InProcessNotificationBus, LoggingListener,
    TaskWorker,
};
use experiment_lifecycle::application::{
    ScheduleExperimentHandler, ScheduleExperimentTask, ScheduleOnCreate,
};
use experiment_lifecycle::config::AppConfig;
use experiment_lifecycle::domain::experiment::{
    EXPERIMENT_CREATED, EXPERIMENT_JOB_CREATED, EXPERIMENT_JOB_STATUS,
};
use experiment_lifecycle::ports::ListenerRegistry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    config.logging.init();

    tracing::info!(
        post_terminal_policy = ?config.lifecycle.post_terminal_policy,
        queue_capacity = config.scheduler.queue_capacity,
        worker_concurrency = config.scheduler.worker_concurrency,
        schedule_on_create = config.scheduler.schedule_on_create,
        "starting experiment lifecycle worker"
    );

    let store = Arc::new(InMemoryExperimentStore::with_policy(
        config.lifecycle.post_terminal_policy,
    ));
    let (queue, tasks) = ChannelTaskQueue::channel(config.scheduler.queue_capacity);
    let queue = Arc::new(queue);

    let bus = Arc::new(InProcessNotificationBus::new());
    bus.subscribe_all(
        &[EXPERIMENT_CREATED, EXPERIMENT_JOB_CREATED, EXPERIMENT_JOB_STATUS],
        Arc::new(LoggingListener::new()),
    );
    if config.scheduler.schedule_on_create {
        bus.subscribe_all(
            ScheduleOnCreate::event_types(),
            Arc::new(ScheduleOnCreate::new(queue.clone())),
        );
    }

    let worker = TaskWorker::new(config.scheduler.worker_concurrency).register(Arc::new(
        ScheduleExperimentTask::new(ScheduleExperimentHandler::new(store.clone(), queue.clone())),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "could not listen for Ctrl+C; shutting down");
        }
        tracing::info!("shutdown requested");
        shutdown_tx.send(true).ok();
    });

    let report = worker.run(tasks, shutdown_rx).await;

    tracing::info!(
        experiments = store.experiment_count(),
        tasks = report.total(),
        "experiment lifecycle worker stopped"
    );
    Ok(())
}
