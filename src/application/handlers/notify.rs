//! Publishing helper shared by mutating handlers.

use crate::domain::foundation::{CommandMetadata, SerializableDomainEvent};
use crate::ports::NotificationPublisher;

/// Publishes `event` with the command's correlation context.
///
/// The mutation has already succeeded when this runs, so failures are
/// logged and never returned.
pub(crate) async fn publish_notification<E>(
    publisher: &dyn NotificationPublisher,
    event: &E,
    metadata: &CommandMetadata,
) where
    E: SerializableDomainEvent,
{
    let envelope = match event.to_envelope() {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!(
                event_type = event.event_type(),
                entity_id = %event.entity_id(),
                error = %e,
                "could not serialize notification"
            );
            return;
        }
    };

    let mut envelope = envelope
        .with_correlation_id(metadata.correlation_id())
        .with_user_id(metadata.user_id.to_string());
    if let Some(trace_id) = metadata.trace_id() {
        envelope = envelope.with_trace_id(trace_id);
    }

    if let Err(e) = publisher.publish(envelope).await {
        tracing::warn!(
            event_type = event.event_type(),
            entity_id = %event.entity_id(),
            error = %e,
            "could not publish notification"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InProcessNotificationBus;
    use crate::domain::experiment::{Experiment, ExperimentCreated};
    use crate::domain::foundation::{ClusterId, ProjectId, UserId};

    fn created() -> ExperimentCreated {
        let experiment = Experiment::builder(
            ClusterId::new(),
            ProjectId::new(),
            UserId::new("researcher-1").unwrap(),
        )
        .build()
        .unwrap();
        ExperimentCreated::from_experiment(&experiment)
    }

    #[tokio::test]
    async fn envelope_carries_command_context() {
        let bus = InProcessNotificationBus::new();
        let metadata = CommandMetadata::new(UserId::new("researcher-1").unwrap())
            .with_correlation_id("req-42")
            .with_trace_id("trace-42");

        publish_notification(&bus, &created(), &metadata).await;

        let published = bus.published_events();
        assert_eq!(published.len(), 1);
        let meta = &published[0].metadata;
        assert_eq!(meta.correlation_id.as_deref(), Some("req-42"));
        assert_eq!(meta.user_id.as_deref(), Some("researcher-1"));
        assert_eq!(meta.trace_id.as_deref(), Some("trace-42"));
    }

    #[tokio::test]
    async fn trace_id_is_omitted_when_command_has_none() {
        let bus = InProcessNotificationBus::new();
        let metadata = CommandMetadata::new(UserId::new("researcher-1").unwrap());

        publish_notification(&bus, &created(), &metadata).await;

        assert!(bus.published_events()[0].metadata.trace_id.is_none());
    }
}
