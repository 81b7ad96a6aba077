//! Domain layer containing lifecycle rules and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors, envelopes)
//! - `lifecycle` - Status tables, status ledgers and experiment status aggregation
//! - `experiment` - Experiment and job entities, metrics, lineage, notifications
//! - `scheduling` - Scheduling attempts and task-queue messages

pub mod experiment;
pub mod foundation;
pub mod lifecycle;
pub mod scheduling;
