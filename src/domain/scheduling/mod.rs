//! Scheduling domain module.
//!
//! The state of a scheduling attempt and the messages placed on the task
//! queue.

mod attempt;
mod task;

pub use attempt::{ScheduleAttempt, ScheduleState};
pub use task::{ExperimentTaskPayload, TaskName, TaskRequest};

/// Reason reported when a scheduling target disappeared before dispatch.
pub const REFERENCE_GONE_REASON: &str = "no longer exists";
