//! Clone lineage checks.
//!
//! Experiments form a forest through their `original_experiment` reference.
//! An experiment may never be its own ancestor.

use std::collections::HashSet;

use crate::domain::foundation::{DomainError, ErrorCode, ExperimentId};

pub(crate) fn self_reference(id: ExperimentId) -> DomainError {
    DomainError::new(
        ErrorCode::LineageCycle,
        "An experiment cannot be its own original",
    )
    .with_detail("experiment_id", id.to_string())
}

/// Checks that `candidate` may name the first entry of `ancestry` as its
/// original.
///
/// `ancestry` is the chain walked upwards from the requested original: the
/// original itself, then its original, and so on.
///
/// # Errors
///
/// - `LineageCycle` if `candidate` appears in the chain, or the chain
///   repeats an id
pub fn validate_lineage(candidate: ExperimentId, ancestry: &[ExperimentId]) -> Result<(), DomainError> {
    let mut seen = HashSet::with_capacity(ancestry.len());
    for ancestor in ancestry {
        if *ancestor == candidate {
            return Err(DomainError::new(
                ErrorCode::LineageCycle,
                "Experiment would become its own ancestor",
            )
            .with_detail("experiment_id", candidate.to_string()));
        }
        if !seen.insert(*ancestor) {
            return Err(DomainError::new(
                ErrorCode::LineageCycle,
                "Stored lineage already contains a cycle",
            )
            .with_detail("experiment_id", ancestor.to_string()));
        }
    }
    Ok(())
}
