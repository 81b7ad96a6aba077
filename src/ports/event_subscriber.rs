//! Listener ports - Interfaces for receiving lifecycle notifications.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Receives lifecycle notifications.
///
/// Implementations should be:
/// - **Quick** - long work belongs on the task queue
/// - **Isolated** - an error affects neither the mutation nor other listeners
///
/// # Example
///
/// ```ignore
/// struct AuditTrail { /* ... */ }
///
/// #[async_trait]
/// impl LifecycleListener for AuditTrail {
///     async fn on_event(&self, event: &EventEnvelope) -> Result<(), DomainError> {
///         let created: ExperimentCreated = event.payload_as()?;
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "AuditTrail"
///     }
/// }
/// ```
#[async_trait]
pub trait LifecycleListener: Send + Sync {
    /// Handle one notification. `(entity_kind, entity_id)` are on the envelope.
    async fn on_event(&self, event: &EventEnvelope) -> Result<(), DomainError>;

    /// Listener name for logs and `ListenerError`.
    fn name(&self) -> &'static str;
}

/// Port for registering listeners.
///
/// Listeners for the same event type are invoked in subscription order.
pub trait ListenerRegistry: Send + Sync {
    /// Subscribe a listener to one event type.
    fn subscribe(&self, event_type: &str, listener: Arc<dyn LifecycleListener>);

    /// Subscribe the same listener to several event types.
    fn subscribe_all(&self, event_types: &[&str], listener: Arc<dyn LifecycleListener>) {
        for event_type in event_types {
            self.subscribe(event_type, Arc::clone(&listener));
        }
    }
}

/// A bus both publishes and accepts subscriptions.
pub trait NotificationBus: super::NotificationPublisher + ListenerRegistry {}

impl<T: super::NotificationPublisher + ListenerRegistry> NotificationBus for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_listener_object_safe(_: &dyn LifecycleListener) {}

    #[allow(dead_code)]
    fn assert_registry_object_safe(_: &dyn ListenerRegistry) {}
}
