//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, notification envelopes and error
//! types that form the vocabulary of the experiment lifecycle domain.

mod command;
mod errors;
mod events;
mod ids;
mod state_machine;
mod timestamp;

pub use command::CommandMetadata;
pub use errors::{DomainError, ErrorCode, ListenerError, ValidationError};
pub use events::{
    domain_event, DomainEvent, EventEnvelope, EventId, EventMetadata, SerializableDomainEvent,
};
pub use ids::{
    ClusterId, ExperimentId, ExperimentJobId, ProjectId, SpecId, StatusEventId, TaskId, UserId,
};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
