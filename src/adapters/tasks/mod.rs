//! Task queue adapters.
//!
//! - `InMemoryTaskQueue` - Records enqueued tasks without running them
//! - `ChannelTaskQueue` - Bounded tokio channel feeding a `TaskWorker`
//! - `TaskWorker` - Runs queued tasks through registered `TaskHandler`s

mod channel;
mod in_memory;
mod worker;

pub use channel::ChannelTaskQueue;
pub use in_memory::InMemoryTaskQueue;
pub use worker::{TaskOutcome, TaskWorker, WorkerReport};
