//! NotificationPublisher port - Interface for publishing lifecycle notifications.
//!
//! Mutating handlers publish through this port without knowing how, or to
//! whom, notifications are delivered.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Port for publishing lifecycle notifications.
///
/// Implementations must ensure:
/// - Delivery completes before `publish` returns
/// - Each call delivers the envelope exactly once to each listener
/// - A failing listener is isolated; its error is never returned here
///
/// # Example
///
/// ```ignore
/// let envelope = ExperimentCreated::from_experiment(&experiment).to_envelope()?;
/// publisher.publish(envelope).await?;
/// ```
#[async_trait]
pub trait NotificationPublisher: Send + Sync {
    /// Deliver one notification.
    ///
    /// # Errors
    ///
    /// - `InternalError` only if the transport itself is unusable
    async fn publish(&self, envelope: EventEnvelope) -> Result<(), DomainError>;
}
