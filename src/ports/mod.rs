//! Ports - Interfaces for external collaborators.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `ExperimentRepository` - Experiments read back as full snapshots
//! - `ExperimentJobRepository` - Jobs under an experiment
//! - `StatusLedger` - Append-only job and experiment status ledgers
//! - `MetricRepository` - Append-only experiment metrics
//!
//! ## Notification Ports
//!
//! - `NotificationPublisher` - Publish lifecycle notifications
//! - `ListenerRegistry` - Register `LifecycleListener`s by event type
//! - `NotificationBus` - Both of the above
//!
//! ## Task Ports
//!
//! - `TaskQueue` - Enqueue named tasks carrying an experiment id
//! - `TaskHandler` - Run one kind of task, reporting `OperationError`

mod event_publisher;
mod event_subscriber;
mod experiment_repository;
mod job_repository;
mod metric_repository;
mod status_ledger;
mod task_queue;

pub use event_publisher::NotificationPublisher;
pub use event_subscriber::{LifecycleListener, ListenerRegistry, NotificationBus};
pub use experiment_repository::ExperimentRepository;
pub use job_repository::ExperimentJobRepository;
pub use metric_repository::MetricRepository;
pub use status_ledger::{AppendedStatus, StatusLedger};
pub use task_queue::{OperationError, TaskHandler, TaskQueue};
