//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to concrete infrastructure:
//! - `memory` - In-memory persistence for experiments, jobs, ledgers, metrics
//! - `events` - Notification bus and listeners
//! - `tasks` - Task queues and the worker that drains them

pub mod events;
pub mod memory;
pub mod tasks;

pub use events::{InProcessNotificationBus, LoggingListener};
pub use memory::InMemoryExperimentStore;
pub use tasks::{ChannelTaskQueue, InMemoryTaskQueue, TaskOutcome, TaskWorker, WorkerReport};
