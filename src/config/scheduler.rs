//! Scheduler and task worker configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Upper bound on concurrently running tasks.
pub const MAX_WORKER_CONCURRENCY: usize = 256;

/// Scheduler configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Capacity of the task channel
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Tasks run at once by the worker
    #[serde(default = "default_worker_concurrency")]
    pub worker_concurrency: usize,

    /// Enqueue a schedule task whenever an experiment is created
    #[serde(default = "default_schedule_on_create")]
    pub schedule_on_create: bool,
}

impl SchedulerConfig {
    /// Validate scheduler configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.queue_capacity == 0 {
            return Err(ValidationError::InvalidQueueCapacity);
        }
        if self.worker_concurrency == 0 || self.worker_concurrency > MAX_WORKER_CONCURRENCY {
            return Err(ValidationError::InvalidConcurrency {
                max: MAX_WORKER_CONCURRENCY,
            });
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            worker_concurrency: default_worker_concurrency(),
            schedule_on_create: default_schedule_on_create(),
        }
    }
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_worker_concurrency() -> usize {
    8
}

fn default_schedule_on_create() -> bool {
    true
}
