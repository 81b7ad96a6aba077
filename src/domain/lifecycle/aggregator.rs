//! Experiment status derived from the latest status of each job.

use super::status::{ExperimentStatus, JobStatus, LifecycleStatus};

/// Derives an experiment's calculated status from a snapshot of job statuses.
///
/// Pure: the same snapshot always yields the same status, regardless of the
/// order jobs appear in.
pub struct StatusAggregator;

impl StatusAggregator {
    /// Returns the highest-ranked status, or `None` for an empty input.
    pub fn dominant<S, I>(statuses: I) -> Option<S>
    where
        S: LifecycleStatus,
        I: IntoIterator<Item = S>,
    {
        let registry = S::registry();
        statuses
            .into_iter()
            .max_by_key(|s| registry.rank(*s).unwrap_or(0))
    }

    /// Calculates an experiment status from each job's latest status.
    ///
    /// A job with no events counts as `created`. With no jobs at all the
    /// experiment's default status is returned.
    pub fn calculate<I>(latest_job_statuses: I) -> ExperimentStatus
    where
        I: IntoIterator<Item = Option<JobStatus>>,
    {
        let mapped = latest_job_statuses
            .into_iter()
            .map(|s| ExperimentStatus::from(s.unwrap_or(JobStatus::Created)));

        Self::dominant(mapped).unwrap_or_else(|| ExperimentStatus::registry().default_status())
    }
}
