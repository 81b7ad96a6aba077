//! Experiment-specific error types.

use crate::domain::foundation::{
    DomainError, ErrorCode, ExperimentId, ExperimentJobId, ValidationError,
};

/// Errors returned by experiment and job handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExperimentError {
    /// Experiment was not found.
    NotFound(ExperimentId),
    /// Experiment job was not found.
    JobNotFound(ExperimentJobId),
    /// A status change the lifecycle policy does not allow.
    InvalidState(String),
    /// Clone lineage would contain a cycle.
    LineageCycle(String),
    /// Validation failed.
    ValidationFailed { field: String, message: String },
    /// Infrastructure error.
    Infrastructure(String),
}

impl ExperimentError {
    pub fn not_found(id: ExperimentId) -> Self {
        ExperimentError::NotFound(id)
    }
    pub fn job_not_found(id: ExperimentJobId) -> Self {
        ExperimentError::JobNotFound(id)
    }
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ExperimentError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }
    pub fn infrastructure(message: impl Into<String>) -> Self {
        ExperimentError::Infrastructure(message.into())
    }
    pub fn code(&self) -> ErrorCode {
        match self {
            ExperimentError::NotFound(_) => ErrorCode::ExperimentNotFound,
            ExperimentError::JobNotFound(_) => ErrorCode::ExperimentJobNotFound,
            ExperimentError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            ExperimentError::LineageCycle(_) => ErrorCode::LineageCycle,
            ExperimentError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            ExperimentError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
    pub fn message(&self) -> String {
        match self {
            ExperimentError::NotFound(id) => format!("Experiment not found: {}", id),
            ExperimentError::JobNotFound(id) => format!("Experiment job not found: {}", id),
            ExperimentError::InvalidState(msg) => format!("Invalid state: {}", msg),
            ExperimentError::LineageCycle(msg) => format!("Invalid lineage: {}", msg),
            ExperimentError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            ExperimentError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for ExperimentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ExperimentError {}

impl From<DomainError> for ExperimentError {
    fn from(err: DomainError) -> Self {
        let detail = |key: &str| err.details.get(key).cloned().unwrap_or_default();
        match err.code {
            ErrorCode::ExperimentNotFound => match detail("experiment_id").parse() {
                Ok(id) => ExperimentError::NotFound(id),
                Err(_) => ExperimentError::Infrastructure(err.to_string()),
            },
            ErrorCode::ExperimentJobNotFound => match detail("job_id").parse() {
                Ok(id) => ExperimentError::JobNotFound(id),
                Err(_) => ExperimentError::Infrastructure(err.to_string()),
            },
            ErrorCode::InvalidStateTransition => ExperimentError::InvalidState(err.message),
            ErrorCode::LineageCycle => ExperimentError::LineageCycle(err.message),
            ErrorCode::ValidationFailed => ExperimentError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => ExperimentError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ValidationError> for ExperimentError {
    fn from(err: ValidationError) -> Self {
        match &err {
            ValidationError::PostTerminalTransition { .. } => {
                ExperimentError::InvalidState(err.to_string())
            }
            ValidationError::EmptyField { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::InvalidFormat { field, .. } => {
                ExperimentError::validation(field.clone(), err.to_string())
            }
            ValidationError::UnknownStatus { .. } => ExperimentError::validation("status", err.to_string()),
            ValidationError::OutOfOrder { .. } => {
                ExperimentError::validation("created_at", err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_round_trips_through_domain_error() {
        let id = ExperimentId::new();
        let domain = DomainError::new(ErrorCode::ExperimentNotFound, "missing")
            .with_detail("experiment_id", id.to_string());

        assert_eq!(ExperimentError::from(domain), ExperimentError::NotFound(id));
    }

    #[test]
    fn not_found_without_id_is_infrastructure() {
        let domain = DomainError::new(ErrorCode::ExperimentNotFound, "missing");
        assert!(matches!(
            ExperimentError::from(domain),
            ExperimentError::Infrastructure(_)
        ));
    }

    #[test]
    fn post_terminal_validation_is_invalid_state() {
        let err = ExperimentError::from(ValidationError::post_terminal(
            "ExperimentJob",
            "succeeded",
            "running",
        ));
        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
    }

    #[test]
    fn unknown_status_is_validation_on_status() {
        let err = ExperimentError::from(ValidationError::unknown_status("ExperimentJob", "warming"));
        assert!(matches!(
            err,
            ExperimentError::ValidationFailed { ref field, .. } if field == "status"
        ));
    }

    #[test]
    fn display_uses_message() {
        let id = ExperimentJobId::new();
        assert_eq!(
            ExperimentError::job_not_found(id).to_string(),
            format!("Experiment job not found: {}", id)
        );
    }
}
