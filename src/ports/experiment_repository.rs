//! Experiment repository port.
//!
//! Defines the contract for storing experiments and reading them back as
//! complete snapshots: the experiment, its jobs and every ledger involved.

use async_trait::async_trait;

use crate::domain::experiment::Experiment;
use crate::domain::foundation::{DomainError, ExperimentId};

/// Repository port for experiments.
///
/// Implementations must ensure:
/// - `find_by_id` returns jobs and ledgers read at one consistent point
/// - Ledgers are never rewritten by `save`
#[async_trait]
pub trait ExperimentRepository: Send + Sync {
    /// Store a new experiment.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if an experiment with this id already exists
    /// - `ValidationFailed` if the experiment already carries jobs or ledger
    ///   events; those are only written through the job repository and
    ///   `StatusLedger`
    /// - `DatabaseError` on persistence failure
    async fn save(&self, experiment: &Experiment) -> Result<(), DomainError>;

    /// Find an experiment with its jobs and its own ledger attached.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: ExperimentId) -> Result<Option<Experiment>, DomainError>;

    /// Check if an experiment exists.
    async fn exists(&self, id: ExperimentId) -> Result<bool, DomainError>;

    /// Returns the `original_experiment` reference of a stored experiment.
    ///
    /// Used to walk lineage without loading whole snapshots. `Ok(None)` if
    /// the experiment is not a clone.
    ///
    /// # Errors
    ///
    /// - `ExperimentNotFound` if the experiment doesn't exist
    async fn original_of(&self, id: ExperimentId) -> Result<Option<ExperimentId>, DomainError>;

    /// Find all direct clones of an experiment, oldest first.
    async fn find_clones(&self, original: ExperimentId) -> Result<Vec<Experiment>, DomainError>;

    /// Delete an experiment with its jobs and ledgers.
    ///
    /// # Errors
    ///
    /// - `ExperimentNotFound` if the experiment doesn't exist
    async fn delete(&self, id: ExperimentId) -> Result<(), DomainError>;
}
