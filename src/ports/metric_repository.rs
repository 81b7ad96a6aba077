//! Experiment metric repository port.

use async_trait::async_trait;

use crate::domain::experiment::ExperimentMetric;
use crate::domain::foundation::{DomainError, ExperimentId};

/// Append-only storage for experiment metrics.
#[async_trait]
pub trait MetricRepository: Send + Sync {
    /// Append a metric.
    ///
    /// # Errors
    ///
    /// - `ExperimentNotFound` if the experiment doesn't exist
    async fn append(&self, metric: &ExperimentMetric) -> Result<(), DomainError>;

    /// Every metric of an experiment, ordered by `created_at`.
    async fn find_by_experiment_id(
        &self,
        experiment_id: ExperimentId,
    ) -> Result<Vec<ExperimentMetric>, DomainError>;
}
