//! RecordJobStatusHandler - Appends to a job's status ledger.
//!
//! Every accepted append is broadcast as `ExperimentJobStatusChanged`.
//! Rejected appends leave the ledger untouched and publish nothing.

use serde_json::Value as JsonValue;
use std::sync::Arc;

use crate::application::handlers::notify::publish_notification;
use crate::domain::experiment::{ExperimentError, ExperimentJobStatusChanged};
use crate::domain::foundation::{CommandMetadata, ExperimentJobId, Timestamp};
use crate::domain::lifecycle::{JobStatus, NewStatusEvent, StatusEvent};
use crate::ports::{ExperimentJobRepository, NotificationPublisher, StatusLedger};

/// Command to record a job status.
#[derive(Debug, Clone)]
pub struct RecordJobStatusCommand {
    pub job_id: ExperimentJobId,
    /// Status label, e.g. `"running"`.
    pub status: String,
    pub message: Option<String>,
    pub details: Option<JsonValue>,
    /// Explicit event time; the current time when `None`.
    pub at: Option<Timestamp>,
}

impl RecordJobStatusCommand {
    pub fn new(job_id: ExperimentJobId, status: impl Into<String>) -> Self {
        Self {
            job_id,
            status: status.into(),
            message: None,
            details: None,
            at: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Result of recording a job status.
#[derive(Debug, Clone)]
pub struct RecordJobStatusResult {
    pub event: StatusEvent<JobStatus>,
    pub previous_status: Option<JobStatus>,
    pub notification: ExperimentJobStatusChanged,
}

/// Handler for recording job statuses.
pub struct RecordJobStatusHandler {
    jobs: Arc<dyn ExperimentJobRepository>,
    ledger: Arc<dyn StatusLedger>,
    publisher: Arc<dyn NotificationPublisher>,
}

impl RecordJobStatusHandler {
    pub fn new(
        jobs: Arc<dyn ExperimentJobRepository>,
        ledger: Arc<dyn StatusLedger>,
        publisher: Arc<dyn NotificationPublisher>,
    ) -> Self {
        Self {
            jobs,
            ledger,
            publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: RecordJobStatusCommand,
        metadata: CommandMetadata,
    ) -> Result<RecordJobStatusResult, ExperimentError> {
        // 1. Parse before touching storage
        let mut event = NewStatusEvent::<JobStatus>::from_label(&cmd.status)?;
        if let Some(message) = cmd.message {
            event = event.with_message(message);
        }
        if let Some(details) = cmd.details {
            event = event.with_details(details);
        }
        if let Some(at) = cmd.at {
            event = event.at(at);
        }

        // 2. Resolve the owning experiment
        let job = self
            .jobs
            .find_by_id(cmd.job_id)
            .await?
            .ok_or_else(|| ExperimentError::job_not_found(cmd.job_id))?;

        // 3. Append
        let appended = self.ledger.append_job_status(cmd.job_id, event).await?;

        tracing::info!(
            job_id = %cmd.job_id,
            experiment_id = %job.experiment_id(),
            status = %appended.event.status,
            previous = ?appended.previous,
            sequence = appended.event.sequence,
            "job status recorded"
        );

        // 4. Notify
        let notification = ExperimentJobStatusChanged::from_event(
            job.experiment_id(),
            &appended.event,
            appended.previous,
        );
        publish_notification(self.publisher.as_ref(), &notification, &metadata).await;

        Ok(RecordJobStatusResult {
            event: appended.event,
            previous_status: appended.previous,
            notification,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryExperimentStore, InProcessNotificationBus};
    use crate::domain::experiment::{Experiment, ExperimentJob, EXPERIMENT_JOB_STATUS};
    use crate::domain::foundation::{
        ClusterId, DomainError, ErrorCode, EventEnvelope, ExperimentId, ProjectId, UserId,
    };
    use crate::domain::lifecycle::PostTerminalPolicy;
    use crate::ports::ExperimentRepository;
    use async_trait::async_trait;
    use serde_json::json;

    fn metadata() -> CommandMetadata {
        CommandMetadata::new(UserId::new("agent-7").unwrap())
    }

    struct Fixture {
        store: Arc<InMemoryExperimentStore>,
        bus: Arc<InProcessNotificationBus>,
        handler: RecordJobStatusHandler,
        experiment_id: ExperimentId,
        job_id: ExperimentJobId,
    }

    async fn setup_with(policy: PostTerminalPolicy) -> Fixture {
        let store = Arc::new(InMemoryExperimentStore::with_policy(policy));
        let bus = Arc::new(InProcessNotificationBus::new());
        let experiment = Experiment::builder(
            ClusterId::new(),
            ProjectId::new(),
            UserId::new("researcher-1").unwrap(),
        )
        .build()
        .unwrap();
        let experiment_id = experiment.id();
        ExperimentRepository::save(store.as_ref(), &experiment)
            .await
            .unwrap();
        let job = ExperimentJob::new(ExperimentJobId::new(), experiment_id, json!({}));
        let job_id = job.id();
        ExperimentJobRepository::save(store.as_ref(), &job)
            .await
            .unwrap();
        Fixture {
            handler: RecordJobStatusHandler::new(store.clone(), store.clone(), bus.clone()),
            store,
            bus,
            experiment_id,
            job_id,
        }
    }

    async fn setup() -> Fixture {
        setup_with(PostTerminalPolicy::default()).await
    }

    async fn record(fixture: &Fixture, status: &str) -> Result<RecordJobStatusResult, ExperimentError> {
        fixture
            .handler
            .handle(RecordJobStatusCommand::new(fixture.job_id, status), metadata())
            .await
    }

    struct FailingPublisher;

    #[async_trait]
    impl NotificationPublisher for FailingPublisher {
        async fn publish(&self, _envelope: EventEnvelope) -> Result<(), DomainError> {
            Err(DomainError::new(ErrorCode::InternalError, "Simulated publish failure"))
        }
    }

    #[tokio::test]
    async fn records_and_publishes_each_status() {
        let fixture = setup().await;

        record(&fixture, "building").await.unwrap();
        let result = fixture
            .handler
            .handle(
                RecordJobStatusCommand::new(fixture.job_id, "running").with_message("pod started"),
                metadata(),
            )
            .await
            .unwrap();

        assert_eq!(result.event.status, JobStatus::Running);
        assert_eq!(result.event.sequence, 2);
        assert_eq!(result.previous_status, Some(JobStatus::Building));
        assert_eq!(result.notification.experiment_id, fixture.experiment_id);

        let published = fixture.bus.events_of_type(EXPERIMENT_JOB_STATUS);
        assert_eq!(published.len(), 2);
        let last: ExperimentJobStatusChanged = published[1].payload_as().unwrap();
        assert_eq!(last.status, JobStatus::Running);
        assert_eq!(last.previous_status, Some(JobStatus::Building));
        assert_eq!(last.message.as_deref(), Some("pod started"));
    }

    #[tokio::test]
    async fn unknown_label_appends_and_publishes_nothing() {
        let fixture = setup().await;

        let err = record(&fixture, "warming").await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::ValidationFailed);
        assert!(fixture.store.job_history(fixture.job_id).await.unwrap().is_empty());
        assert_eq!(fixture.bus.event_count(), 0);
    }

    #[tokio::test]
    async fn missing_job_is_job_not_found() {
        let fixture = setup().await;
        let missing = ExperimentJobId::new();

        let err = fixture
            .handler
            .handle(RecordJobStatusCommand::new(missing, "running"), metadata())
            .await
            .unwrap_err();

        assert_eq!(err, ExperimentError::JobNotFound(missing));
    }

    #[tokio::test]
    async fn running_after_terminal_is_rejected_by_default() {
        let fixture = setup().await;
        record(&fixture, "succeeded").await.unwrap();
        fixture.bus.clear();

        let err = record(&fixture, "running").await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
        assert_eq!(fixture.bus.event_count(), 0);
        assert_eq!(fixture.store.job_history(fixture.job_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn terminal_after_terminal_overrides_by_default() {
        let fixture = setup().await;
        record(&fixture, "stopped").await.unwrap();

        let result = record(&fixture, "failed").await.unwrap();

        assert_eq!(result.previous_status, Some(JobStatus::Stopped));
        assert_eq!(result.event.status, JobStatus::Failed);
    }

    #[tokio::test]
    async fn allow_policy_accepts_running_after_terminal() {
        let fixture = setup_with(PostTerminalPolicy::Allow).await;
        record(&fixture, "failed").await.unwrap();

        let result = record(&fixture, "running").await.unwrap();

        assert_eq!(result.event.status, JobStatus::Running);
    }

    #[tokio::test]
    async fn forbid_policy_rejects_any_status_after_terminal() {
        let fixture = setup_with(PostTerminalPolicy::Forbid).await;
        record(&fixture, "failed").await.unwrap();

        let err = record(&fixture, "stopped").await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
    }

    #[tokio::test]
    async fn publish_failure_keeps_the_append() {
        let fixture = setup().await;
        let handler = RecordJobStatusHandler::new(
            fixture.store.clone(),
            fixture.store.clone(),
            Arc::new(FailingPublisher),
        );

        let result = handler
            .handle(RecordJobStatusCommand::new(fixture.job_id, "building"), metadata())
            .await;

        assert!(result.is_ok());
        let history = fixture.store.job_history(fixture.job_id).await.unwrap();
        assert_eq!(history.latest().map(|e| e.status), Some(JobStatus::Building));
    }
}
