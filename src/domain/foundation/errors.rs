//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors raised when a value or a status transition fails validation.
///
/// Validation errors are recovered locally by rejecting the mutation;
/// nothing is ever coerced into a valid value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be at most {max} characters, got {actual}")]
    TooLong {
        field: String,
        max: usize,
        actual: usize,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("Unknown {kind} status '{label}'")]
    UnknownStatus { kind: String, label: String },

    #[error("{kind} status cannot change from terminal '{from}' to '{to}'")]
    PostTerminalTransition {
        kind: String,
        from: String,
        to: String,
    },

    #[error("Status event at {attempted} precedes latest ledger entry at {latest}")]
    OutOfOrder { attempted: String, latest: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField {
            field: field.into(),
        }
    }

    /// Creates a too-long validation error.
    pub fn too_long(field: impl Into<String>, max: usize, actual: usize) -> Self {
        ValidationError::TooLong {
            field: field.into(),
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates an unknown status label error.
    pub fn unknown_status(kind: impl fmt::Display, label: impl Into<String>) -> Self {
        ValidationError::UnknownStatus {
            kind: kind.to_string(),
            label: label.into(),
        }
    }

    /// Creates a post-terminal transition error.
    pub fn post_terminal(
        kind: impl fmt::Display,
        from: impl fmt::Display,
        to: impl fmt::Display,
    ) -> Self {
        ValidationError::PostTerminalTransition {
            kind: kind.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// A notification listener failed while handling an event.
///
/// Listener errors are isolated at the bus boundary: they are logged and
/// never fail the mutation that produced the notification.
#[derive(Debug, Clone, Error)]
#[error("Listener '{listener}' failed on '{event_type}': {reason}")]
pub struct ListenerError {
    pub listener: String,
    pub event_type: String,
    pub reason: String,
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    InvalidStateTransition,
    LineageCycle,

    // Not found errors
    ExperimentNotFound,
    ExperimentJobNotFound,

    // Scheduling errors
    ReferenceGone,
    QueueUnavailable,

    // Notification errors
    ListenerFailed,

    // Infrastructure errors
    DatabaseError,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::LineageCycle => "LINEAGE_CYCLE",
            ErrorCode::ExperimentNotFound => "EXPERIMENT_NOT_FOUND",
            ErrorCode::ExperimentJobNotFound => "EXPERIMENT_JOB_NOT_FOUND",
            ErrorCode::ReferenceGone => "REFERENCE_GONE",
            ErrorCode::QueueUnavailable => "QUEUE_UNAVAILABLE",
            ErrorCode::ListenerFailed => "LISTENER_FAILED",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message).with_detail("field", field.into())
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Returns true if this error carries the given code.
    pub fn is(&self, code: ErrorCode) -> bool {
        self.code == code
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let code = match err {
            ValidationError::PostTerminalTransition { .. } => ErrorCode::InvalidStateTransition,
            _ => ErrorCode::ValidationFailed,
        };
        DomainError::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("name");
        assert_eq!(format!("{}", err), "Field 'name' cannot be empty");
    }

    #[test]
    fn validation_error_unknown_status_names_kind_and_label() {
        let err = ValidationError::unknown_status("ExperimentJob", "exploded");
        assert_eq!(format!("{}", err), "Unknown ExperimentJob status 'exploded'");
    }

    #[test]
    fn validation_error_post_terminal_displays_transition() {
        let err = ValidationError::post_terminal("ExperimentJob", "succeeded", "running");
        assert_eq!(
            format!("{}", err),
            "ExperimentJob status cannot change from terminal 'succeeded' to 'running'"
        );
    }

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::ExperimentNotFound, "Experiment not found");
        assert_eq!(
            format!("{}", err),
            "[EXPERIMENT_NOT_FOUND] Experiment not found"
        );
    }

    #[test]
    fn domain_error_with_detail_adds_detail() {
        let err = DomainError::new(ErrorCode::ValidationFailed, "Validation failed")
            .with_detail("field", "status")
            .with_detail("reason", "unknown label");

        assert_eq!(err.details.get("field"), Some(&"status".to_string()));
        assert_eq!(err.details.get("reason"), Some(&"unknown label".to_string()));
    }

    #[test]
    fn post_terminal_validation_maps_to_state_transition_code() {
        let err: DomainError = ValidationError::post_terminal("Experiment", "failed", "running").into();
        assert!(err.is(ErrorCode::InvalidStateTransition));
    }

    #[test]
    fn other_validation_maps_to_validation_failed() {
        let err: DomainError = ValidationError::empty_field("config").into();
        assert!(err.is(ErrorCode::ValidationFailed));
    }

    #[test]
    fn listener_error_displays_listener_and_event() {
        let err = ListenerError {
            listener: "AuditTrail".to_string(),
            event_type: "experiment.created.v1".to_string(),
            reason: "disk full".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Listener 'AuditTrail' failed on 'experiment.created.v1': disk full"
        );
    }
}
