//! RecordMetricHandler - Appends a metric batch to an experiment.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::experiment::{ExperimentError, ExperimentMetric};
use crate::domain::foundation::ExperimentId;
use crate::ports::{ExperimentRepository, MetricRepository};

/// Command to record metric values for an experiment.
#[derive(Debug, Clone)]
pub struct RecordMetricCommand {
    pub experiment_id: ExperimentId,
    pub values: BTreeMap<String, f64>,
}

/// Handler for recording metrics.
pub struct RecordMetricHandler {
    experiments: Arc<dyn ExperimentRepository>,
    metrics: Arc<dyn MetricRepository>,
}

impl RecordMetricHandler {
    pub fn new(
        experiments: Arc<dyn ExperimentRepository>,
        metrics: Arc<dyn MetricRepository>,
    ) -> Self {
        Self {
            experiments,
            metrics,
        }
    }

    pub async fn handle(&self, cmd: RecordMetricCommand) -> Result<ExperimentMetric, ExperimentError> {
        if !self.experiments.exists(cmd.experiment_id).await? {
            return Err(ExperimentError::not_found(cmd.experiment_id));
        }

        let metric = ExperimentMetric::new(cmd.experiment_id, cmd.values)?;
        self.metrics.append(&metric).await?;

        tracing::debug!(
            experiment_id = %cmd.experiment_id,
            values = metric.values().len(),
            "metric recorded"
        );

        Ok(metric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryExperimentStore;
    use crate::domain::experiment::Experiment;
    use crate::domain::foundation::{ClusterId, ErrorCode, ProjectId, UserId};

    async fn setup() -> (Arc<InMemoryExperimentStore>, RecordMetricHandler, ExperimentId) {
        let store = Arc::new(InMemoryExperimentStore::new());
        let experiment = Experiment::builder(
            ClusterId::new(),
            ProjectId::new(),
            UserId::new("researcher-1").unwrap(),
        )
        .build()
        .unwrap();
        let id = experiment.id();
        ExperimentRepository::save(store.as_ref(), &experiment)
            .await
            .unwrap();
        let handler = RecordMetricHandler::new(store.clone(), store.clone());
        (store, handler, id)
    }

    fn values(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[tokio::test]
    async fn records_metric_for_experiment() {
        let (store, handler, id) = setup().await;

        handler
            .handle(RecordMetricCommand {
                experiment_id: id,
                values: values(&[("loss", 0.25), ("accuracy", 0.91)]),
            })
            .await
            .unwrap();

        let stored = store.find_by_experiment_id(id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].value("accuracy"), Some(0.91));
    }

    #[tokio::test]
    async fn rejects_non_finite_values() {
        let (store, handler, id) = setup().await;

        let err = handler
            .handle(RecordMetricCommand {
                experiment_id: id,
                values: values(&[("loss", f64::NAN)]),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::ValidationFailed);
        assert!(store.find_by_experiment_id(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_experiment_is_not_found() {
        let (_, handler, _) = setup().await;
        let missing = ExperimentId::new();

        let err = handler
            .handle(RecordMetricCommand {
                experiment_id: missing,
                values: values(&[("loss", 1.0)]),
            })
            .await
            .unwrap_err();

        assert_eq!(err, ExperimentError::NotFound(missing));
    }
}
