//! In-memory persistence adapters.

mod experiment_store;

pub use experiment_store::InMemoryExperimentStore;
