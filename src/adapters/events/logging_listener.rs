//! Listener that writes every notification to the log.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};
use crate::ports::LifecycleListener;

/// Logs lifecycle notifications at `info` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingListener;

impl LoggingListener {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LifecycleListener for LoggingListener {
    async fn on_event(&self, event: &EventEnvelope) -> Result<(), DomainError> {
        tracing::info!(
            event_id = %event.event_id,
            event_type = %event.event_type,
            entity_kind = %event.entity_kind,
            entity_id = %event.entity_id,
            correlation_id = event.metadata.correlation_id.as_deref().unwrap_or("-"),
            "lifecycle notification"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "LoggingListener"
    }
}
