//! Append-only status ledger for a single entity.
//!
//! Events are ordered by `created_at`, ties broken by `sequence`. Nothing in
//! a ledger is ever updated or removed; appends are all-or-nothing.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::foundation::{StatusEventId, Timestamp, ValidationError};

use super::status::{ExperimentStatus, JobStatus, LifecycleStatus};

/// Maximum length of a status message, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 256;

/// One recorded status change. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StatusEvent<S: LifecycleStatus> {
    pub id: StatusEventId,
    pub entity_id: S::EntityId,
    pub status: S,
    pub created_at: Timestamp,
    /// Insertion order within the ledger, starting at 1.
    pub sequence: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

/// A status change waiting to be appended.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStatusEvent<S> {
    pub status: S,
    pub message: Option<String>,
    pub details: Option<JsonValue>,
    /// Explicit event time. `None` stamps the append time.
    pub at: Option<Timestamp>,
}

impl<S: LifecycleStatus> NewStatusEvent<S> {
    pub fn new(status: S) -> Self {
        Self {
            status,
            message: None,
            details: None,
            at: None,
        }
    }

    /// Parses a backend-reported label. Unknown labels never reach a ledger.
    pub fn from_label(label: &str) -> Result<Self, ValidationError> {
        S::registry().parse(label).map(Self::new)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_details(mut self, details: JsonValue) -> Self {
        self.details = Some(details);
        self
    }

    pub fn at(mut self, at: Timestamp) -> Self {
        self.at = Some(at);
        self
    }
}

/// What may follow a terminal status in a ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostTerminalPolicy {
    /// Nothing may be appended after a terminal status.
    Forbid,
    /// Only another terminal status may follow, e.g. a late stop after success.
    #[default]
    TerminalOverride,
    /// Any status may follow.
    Allow,
}

impl PostTerminalPolicy {
    /// Whether a status may be appended after a terminal one.
    pub fn permits(&self, next_is_done: bool) -> bool {
        match self {
            PostTerminalPolicy::Forbid => false,
            PostTerminalPolicy::TerminalOverride => next_is_done,
            PostTerminalPolicy::Allow => true,
        }
    }
}

/// The status ledger owned by one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusHistory<S: LifecycleStatus> {
    entity_id: S::EntityId,
    events: Vec<StatusEvent<S>>,
}

impl<S: LifecycleStatus> StatusHistory<S> {
    pub fn new(entity_id: S::EntityId) -> Self {
        Self {
            entity_id,
            events: Vec::new(),
        }
    }

    /// Rebuilds a ledger from stored events, restoring ledger order.
    pub fn from_events(entity_id: S::EntityId, mut events: Vec<StatusEvent<S>>) -> Self {
        events.sort_by_key(|e| (e.created_at, e.sequence));
        Self { entity_id, events }
    }

    pub fn entity_id(&self) -> S::EntityId {
        self.entity_id
    }

    /// Appends a status change.
    ///
    /// Fails without touching the ledger when the status is not registered
    /// for this kind, the policy rejects a change after a terminal status,
    /// the message is too long, or an explicit timestamp predates the latest
    /// event.
    pub fn append(
        &mut self,
        new: NewStatusEvent<S>,
        policy: PostTerminalPolicy,
    ) -> Result<&StatusEvent<S>, ValidationError> {
        let registry = S::registry();
        if !registry.contains(new.status) {
            return Err(ValidationError::unknown_status(S::KIND, new.status.label()));
        }

        if let Some(message) = &new.message {
            let length = message.chars().count();
            if length > MAX_MESSAGE_LENGTH {
                return Err(ValidationError::too_long(
                    "message",
                    MAX_MESSAGE_LENGTH,
                    length,
                ));
            }
        }

        let latest = self.latest();

        if let Some(latest) = latest {
            if registry.is_done(latest.status) && !policy.permits(registry.is_done(new.status)) {
                return Err(ValidationError::post_terminal(
                    S::KIND,
                    latest.status,
                    new.status,
                ));
            }
        }

        let floor = latest.map(|e| e.created_at);
        let created_at = match (new.at, floor) {
            (Some(at), Some(floor)) if at.is_before(&floor) => {
                return Err(ValidationError::OutOfOrder {
                    attempted: at.as_datetime().to_rfc3339(),
                    latest: floor.as_datetime().to_rfc3339(),
                });
            }
            (Some(at), _) => at,
            // wall clock may step backwards; never let the ledger do so
            (None, Some(floor)) => Timestamp::now().max(floor),
            (None, None) => Timestamp::now(),
        };
        let sequence = latest.map(|e| e.sequence + 1).unwrap_or(1);

        let index = self.events.len();
        self.events.push(StatusEvent {
            id: StatusEventId::new(),
            entity_id: self.entity_id,
            status: new.status,
            created_at,
            sequence,
            message: new.message,
            details: new.details,
        });

        Ok(&self.events[index])
    }

    /// Most recent event; `None` means the entity has not started.
    pub fn latest(&self) -> Option<&StatusEvent<S>> {
        self.events.last()
    }

    pub fn first(&self) -> Option<&StatusEvent<S>> {
        self.events.first()
    }

    /// Earliest event whose status is in `statuses`.
    pub fn first_matching(&self, statuses: &[S]) -> Option<&StatusEvent<S>> {
        self.events.iter().find(|e| statuses.contains(&e.status))
    }

    /// Latest event whose status is in `statuses`.
    pub fn last_matching(&self, statuses: &[S]) -> Option<&StatusEvent<S>> {
        self.events.iter().rev().find(|e| statuses.contains(&e.status))
    }

    pub fn first_with(&self, status: S) -> Option<&StatusEvent<S>> {
        self.first_matching(&[status])
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[StatusEvent<S>] {
        &self.events
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEvent<S>> {
        self.events.iter()
    }

    pub fn last_status(&self) -> Option<S> {
        self.latest().map(|e| e.status)
    }

    /// Whether the latest status is classified running for this kind.
    pub fn is_running(&self) -> bool {
        self.last_status()
            .is_some_and(|s| S::registry().is_running(s))
    }

    /// Whether the latest status is terminal for this kind.
    pub fn is_done(&self) -> bool {
        self.last_status().is_some_and(|s| S::registry().is_done(s))
    }
}

impl StatusHistory<ExperimentStatus> {
    /// Time of the first `starting` signal.
    pub fn started_at(&self) -> Option<Timestamp> {
        self.first_with(ExperimentStatus::Starting)
            .map(|e| e.created_at)
    }

    /// Time of the first terminal signal.
    pub fn finished_at(&self) -> Option<Timestamp> {
        self.first_matching(&ExperimentStatus::registry().done())
            .map(|e| e.created_at)
    }
}

impl StatusHistory<JobStatus> {
    /// Time of the first `building` event.
    pub fn started_at(&self) -> Option<Timestamp> {
        self.first_with(JobStatus::Building).map(|e| e.created_at)
    }

    /// Time of the last terminal event, so a late stop supersedes a success.
    pub fn finished_at(&self) -> Option<Timestamp> {
        self.last_matching(&JobStatus::registry().done())
            .map(|e| e.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ExperimentJobId;
    use crate::domain::lifecycle::JobStatus;
    use serde_json::json;

    fn ledger() -> StatusHistory<JobStatus> {
        StatusHistory::new(ExperimentJobId::new())
    }

    fn append_all(history: &mut StatusHistory<JobStatus>, statuses: &[JobStatus]) {
        for status in statuses {
            history
                .append(NewStatusEvent::new(*status), PostTerminalPolicy::default())
                .unwrap();
        }
    }

    #[test]
    fn empty_ledger_has_no_latest() {
        let history = ledger();
        assert!(history.is_empty());
        assert!(history.latest().is_none());
        assert!(history.first().is_none());
    }

    #[test]
    fn append_assigns_increasing_sequence_and_monotonic_time() {
        let mut history = ledger();
        append_all(
            &mut history,
            &[JobStatus::Created, JobStatus::Building, JobStatus::Running],
        );

        let sequences: Vec<u64> = history.iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3]);
        for pair in history.events().windows(2) {
            assert!(!pair[1].created_at.is_before(&pair[0].created_at));
        }
        assert_eq!(history.latest().unwrap().status, JobStatus::Running);
    }

    #[test]
    fn append_copies_message_and_details() {
        let mut history = ledger();
        let job_id = history.entity_id();
        let event = history
            .append(
                NewStatusEvent::new(JobStatus::Failed)
                    .with_message("OOMKilled")
                    .with_details(json!({"exit_code": 137})),
                PostTerminalPolicy::Forbid,
            )
            .unwrap();

        assert_eq!(event.message.as_deref(), Some("OOMKilled"));
        assert_eq!(event.details, Some(json!({"exit_code": 137})));
        assert_eq!(event.entity_id, job_id);
    }

    #[test]
    fn first_and_last_matching_pick_ends() {
        let mut history = ledger();
        append_all(
            &mut history,
            &[
                JobStatus::Building,
                JobStatus::Running,
                JobStatus::Succeeded,
                JobStatus::Stopped,
            ],
        );
        let done = [JobStatus::Succeeded, JobStatus::Failed, JobStatus::Stopped];

        assert_eq!(history.first_matching(&done).unwrap().status, JobStatus::Succeeded);
        assert_eq!(history.last_matching(&done).unwrap().status, JobStatus::Stopped);
        assert_eq!(history.first_with(JobStatus::Running).unwrap().sequence, 2);
        assert!(history.first_with(JobStatus::Scheduled).is_none());
    }

    #[test]
    fn terminal_override_accepts_late_stop_only() {
        let mut history = ledger();
        append_all(&mut history, &[JobStatus::Succeeded]);

        let err = history
            .append(
                NewStatusEvent::new(JobStatus::Running),
                PostTerminalPolicy::TerminalOverride,
            )
            .unwrap_err();
        assert!(matches!(err, ValidationError::PostTerminalTransition { .. }));
        assert_eq!(history.len(), 1);

        history
            .append(
                NewStatusEvent::new(JobStatus::Stopped),
                PostTerminalPolicy::TerminalOverride,
            )
            .unwrap();
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn forbid_rejects_everything_after_terminal() {
        let mut history = ledger();
        append_all(&mut history, &[JobStatus::Succeeded]);

        for next in [JobStatus::Stopped, JobStatus::Running] {
            let result = history.append(NewStatusEvent::new(next), PostTerminalPolicy::Forbid);
            assert!(result.is_err());
        }
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn allow_accepts_anything_after_terminal() {
        let mut history = ledger();
        append_all(&mut history, &[JobStatus::Succeeded]);

        for next in [JobStatus::Stopped, JobStatus::Running] {
            history
                .append(NewStatusEvent::new(next), PostTerminalPolicy::Allow)
                .unwrap();
        }
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn explicit_timestamp_before_latest_is_rejected() {
        let mut history = ledger();
        history
            .append(
                NewStatusEvent::new(JobStatus::Building).at(Timestamp::from_unix_millis(2_000)),
                PostTerminalPolicy::default(),
            )
            .unwrap();

        let err = history
            .append(
                NewStatusEvent::new(JobStatus::Running).at(Timestamp::from_unix_millis(1_000)),
                PostTerminalPolicy::default(),
            )
            .unwrap_err();

        assert!(matches!(err, ValidationError::OutOfOrder { .. }));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn equal_explicit_timestamps_keep_insertion_order() {
        let mut history = ledger();
        let at = Timestamp::from_unix_millis(5_000);
        for status in [JobStatus::Building, JobStatus::Scheduled] {
            history
                .append(NewStatusEvent::new(status).at(at), PostTerminalPolicy::default())
                .unwrap();
        }
        assert_eq!(history.latest().unwrap().status, JobStatus::Scheduled);
    }

    #[test]
    fn too_long_message_is_rejected() {
        let mut history = ledger();
        let result = history.append(
            NewStatusEvent::new(JobStatus::Failed).with_message("x".repeat(257)),
            PostTerminalPolicy::default(),
        );
        assert!(matches!(result, Err(ValidationError::TooLong { max: 256, actual: 257, .. })));
        assert!(history.is_empty());
    }

    #[test]
    fn job_ledger_started_and_finished() {
        let mut history = ledger();
        let at = |millis| Timestamp::from_unix_millis(millis);
        for (status, millis) in [
            (JobStatus::Scheduled, 1_000),
            (JobStatus::Building, 2_000),
            (JobStatus::Succeeded, 3_000),
            (JobStatus::Stopped, 4_000),
        ] {
            history
                .append(NewStatusEvent::new(status).at(at(millis)), PostTerminalPolicy::default())
                .unwrap();
        }

        assert_eq!(history.started_at(), Some(at(2_000)));
        assert_eq!(history.finished_at(), Some(at(4_000)));
        assert!(history.is_done());
        assert!(!history.is_running());
    }

    #[test]
    fn experiment_ledger_finishes_at_first_terminal_signal() {
        let mut history: StatusHistory<ExperimentStatus> =
            StatusHistory::new(crate::domain::foundation::ExperimentId::new());
        let at = |millis| Timestamp::from_unix_millis(millis);
        for (status, millis) in [
            (ExperimentStatus::Starting, 1_000),
            (ExperimentStatus::Failed, 2_000),
            (ExperimentStatus::Stopped, 3_000),
        ] {
            history
                .append(NewStatusEvent::new(status).at(at(millis)), PostTerminalPolicy::Allow)
                .unwrap();
        }

        assert_eq!(history.started_at(), Some(at(1_000)));
        assert_eq!(history.finished_at(), Some(at(2_000)));
        assert_eq!(history.last_status(), Some(ExperimentStatus::Stopped));
    }

    #[test]
    fn empty_ledger_is_neither_running_nor_done() {
        let history = ledger();
        assert!(!history.is_running());
        assert!(!history.is_done());
        assert!(history.started_at().is_none());
        assert!(history.finished_at().is_none());
    }

    #[test]
    fn from_label_rejects_unknown_labels() {
        assert!(NewStatusEvent::<JobStatus>::from_label("running").is_ok());
        let err = NewStatusEvent::<JobStatus>::from_label("warming_up").unwrap_err();
        assert!(matches!(err, ValidationError::UnknownStatus { .. }));
    }

    #[test]
    fn from_events_restores_ledger_order() {
        let mut source = ledger();
        append_all(&mut source, &[JobStatus::Created, JobStatus::Building]);
        let mut stored = source.events().to_vec();
        stored.reverse();

        let restored = StatusHistory::from_events(source.entity_id(), stored);

        assert_eq!(restored, source);
    }

    #[test]
    fn status_event_serializes_label() {
        let mut history = ledger();
        append_all(&mut history, &[JobStatus::Scheduled]);
        let json = serde_json::to_value(history.latest().unwrap()).unwrap();
        assert_eq!(json["status"], "scheduled");
        assert!(json.get("message").is_none());
    }
}
