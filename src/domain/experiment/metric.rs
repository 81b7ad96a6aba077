//! Experiment metrics.
//!
//! Metrics share the ledger discipline of statuses: appended, ordered by
//! time, never edited.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{DomainError, ExperimentId, Timestamp};

/// One batch of named numeric values reported for an experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentMetric {
    experiment_id: ExperimentId,
    created_at: Timestamp,
    values: BTreeMap<String, f64>,
}

impl ExperimentMetric {
    /// Creates a metric stamped with the current time.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if there are no values, a name is blank, or a
    ///   value is NaN or infinite
    pub fn new(
        experiment_id: ExperimentId,
        values: BTreeMap<String, f64>,
    ) -> Result<Self, DomainError> {
        if values.is_empty() {
            return Err(DomainError::validation("values", "At least one value is required"));
        }
        for (name, value) in &values {
            if name.trim().is_empty() {
                return Err(DomainError::validation("values", "Metric names cannot be blank"));
            }
            if !value.is_finite() {
                return Err(DomainError::validation(
                    "values",
                    format!("Metric '{}' must be a finite number", name),
                ));
            }
        }

        Ok(Self {
            experiment_id,
            created_at: Timestamp::now(),
            values,
        })
    }

    pub fn experiment_id(&self) -> ExperimentId {
        self.experiment_id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn values(&self) -> &BTreeMap<String, f64> {
        &self.values
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }
}
