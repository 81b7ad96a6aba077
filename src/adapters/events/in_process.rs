//! In-process notification bus.
//!
//! Delivers every notification to its listeners before `publish` returns,
//! in subscription order. Listener failures are logged and swallowed.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::foundation::{DomainError, EventEnvelope, ListenerError};
use crate::ports::{LifecycleListener, ListenerRegistry, NotificationPublisher};

/// Synchronous, in-process notification bus.
///
/// Features:
/// - Delivery completes inside `publish`
/// - Listener errors are wrapped in `ListenerError` and logged, never returned
/// - Published envelopes and listener failures are captured for inspection
///
/// # Example
///
/// ```ignore
/// let bus = Arc::new(InProcessNotificationBus::new());
/// bus.subscribe(EXPERIMENT_CREATED, Arc::new(LoggingListener::new()));
///
/// bus.publish(envelope).await?;
///
/// assert_eq!(bus.event_count(), 1);
/// assert!(bus.has_event(EXPERIMENT_CREATED));
/// ```
pub struct InProcessNotificationBus {
    listeners: RwLock<HashMap<String, Vec<Arc<dyn LifecycleListener>>>>,
    published: RwLock<Vec<EventEnvelope>>,
    failures: RwLock<Vec<ListenerError>>,
}

impl InProcessNotificationBus {
    /// Creates a new bus with no listeners.
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            published: RwLock::new(Vec::new()),
            failures: RwLock::new(Vec::new()),
        }
    }

    // === Inspection ===

    /// Returns all published envelopes, oldest first.
    pub fn published_events(&self) -> Vec<EventEnvelope> {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns envelopes of a specific type.
    pub fn events_of_type(&self, event_type: &str) -> Vec<EventEnvelope> {
        self.published_events()
            .into_iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Returns envelopes for a specific entity.
    pub fn events_for_entity(&self, entity_id: &str) -> Vec<EventEnvelope> {
        self.published_events()
            .into_iter()
            .filter(|e| e.entity_id == entity_id)
            .collect()
    }

    /// Returns count of published envelopes.
    pub fn event_count(&self) -> usize {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Checks if a specific event type was published.
    pub fn has_event(&self, event_type: &str) -> bool {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|e| e.event_type == event_type)
    }

    /// Listener failures seen so far.
    pub fn listener_failures(&self) -> Vec<ListenerError> {
        self.failures
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Clears captured envelopes and failures.
    pub fn clear(&self) {
        self.published
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.failures
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of listeners subscribed to `event_type`.
    pub fn listener_count(&self, event_type: &str) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event_type)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

impl Default for InProcessNotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationPublisher for InProcessNotificationBus {
    async fn publish(&self, envelope: EventEnvelope) -> Result<(), DomainError> {
        self.published
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(envelope.clone());

        // Clone listeners to release lock before await points
        let listeners: Vec<Arc<dyn LifecycleListener>> = {
            let listeners = self
                .listeners
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            listeners
                .get(&envelope.event_type)
                .cloned()
                .unwrap_or_default()
        };

        tracing::debug!(
            event_type = %envelope.event_type,
            entity_kind = %envelope.entity_kind,
            entity_id = %envelope.entity_id,
            listeners = listeners.len(),
            "delivering notification"
        );

        for listener in listeners {
            if let Err(e) = listener.on_event(&envelope).await {
                let failure = ListenerError {
                    listener: listener.name().to_string(),
                    event_type: envelope.event_type.clone(),
                    reason: e.to_string(),
                };
                tracing::warn!(
                    listener = listener.name(),
                    event_type = %envelope.event_type,
                    entity_id = %envelope.entity_id,
                    error = %failure,
                    "listener failed; mutation is unaffected"
                );
                self.failures
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(failure);
            }
        }

        Ok(())
    }
}

impl ListenerRegistry for InProcessNotificationBus {
    fn subscribe(&self, event_type: &str, listener: Arc<dyn LifecycleListener>) {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        listeners
            .entry(event_type.to_string())
            .or_default()
            .push(listener);
    }
}
