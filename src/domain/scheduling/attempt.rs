//! A single scheduling attempt and its state machine.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ExperimentId, StateMachine, TaskId, ValidationError};

/// State of one scheduling attempt.
///
/// `Requested → Validated → Dispatched`, or `Requested → Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleState {
    Requested,
    Validated,
    Dispatched,
    Rejected,
}

impl StateMachine for ScheduleState {
    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            ScheduleState::Requested => vec![ScheduleState::Validated, ScheduleState::Rejected],
            ScheduleState::Validated => vec![ScheduleState::Dispatched],
            ScheduleState::Dispatched | ScheduleState::Rejected => vec![],
        }
    }
}

/// Record of one attempt to schedule an experiment.
///
/// Keeps every state it passed through, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleAttempt {
    experiment_id: ExperimentId,
    trail: Vec<ScheduleState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    task_id: Option<TaskId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl ScheduleAttempt {
    pub fn new(experiment_id: ExperimentId) -> Self {
        Self {
            experiment_id,
            trail: vec![ScheduleState::Requested],
            task_id: None,
            reason: None,
        }
    }

    pub fn experiment_id(&self) -> ExperimentId {
        self.experiment_id
    }

    pub fn state(&self) -> ScheduleState {
        self.trail
            .last()
            .copied()
            .unwrap_or(ScheduleState::Requested)
    }

    /// Every state visited, starting with `Requested`.
    pub fn trail(&self) -> &[ScheduleState] {
        &self.trail
    }

    /// Task enqueued on dispatch.
    pub fn task_id(&self) -> Option<TaskId> {
        self.task_id
    }

    /// Why the attempt was rejected.
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn is_dispatched(&self) -> bool {
        self.state() == ScheduleState::Dispatched
    }

    pub fn is_rejected(&self) -> bool {
        self.state() == ScheduleState::Rejected
    }

    /// The target still exists.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        self.advance(ScheduleState::Validated)
    }

    /// The build request was enqueued as `task_id`.
    pub fn dispatch(&mut self, task_id: TaskId) -> Result<(), ValidationError> {
        self.advance(ScheduleState::Dispatched)?;
        self.task_id = Some(task_id);
        Ok(())
    }

    pub fn reject(&mut self, reason: impl Into<String>) -> Result<(), ValidationError> {
        self.advance(ScheduleState::Rejected)?;
        self.reason = Some(reason.into());
        Ok(())
    }

    fn advance(&mut self, target: ScheduleState) -> Result<(), ValidationError> {
        let next = self.state().transition_to(target)?;
        self.trail.push(next);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_attempt_is_requested() {
        let attempt = ScheduleAttempt::new(ExperimentId::new());
        assert_eq!(attempt.state(), ScheduleState::Requested);
        assert_eq!(attempt.trail(), &[ScheduleState::Requested]);
    }

    #[test]
    fn success_path_records_full_trail() {
        let mut attempt = ScheduleAttempt::new(ExperimentId::new());
        let task_id = TaskId::new();
        attempt.validate().unwrap();
        attempt.dispatch(task_id).unwrap();

        assert!(attempt.is_dispatched());
        assert_eq!(attempt.task_id(), Some(task_id));
        assert_eq!(
            attempt.trail(),
            &[
                ScheduleState::Requested,
                ScheduleState::Validated,
                ScheduleState::Dispatched
            ]
        );
    }

    #[test]
    fn rejection_keeps_reason() {
        let mut attempt = ScheduleAttempt::new(ExperimentId::new());
        attempt.reject("no longer exists").unwrap();

        assert!(attempt.is_rejected());
        assert_eq!(attempt.reason(), Some("no longer exists"));
        assert!(attempt.task_id().is_none());
    }

    #[test]
    fn cannot_dispatch_without_validation() {
        let mut attempt = ScheduleAttempt::new(ExperimentId::new());
        assert!(attempt.dispatch(TaskId::new()).is_err());
        assert_eq!(attempt.trail().len(), 1);
    }

    #[test]
    fn cannot_reject_after_validation() {
        let mut attempt = ScheduleAttempt::new(ExperimentId::new());
        attempt.validate().unwrap();
        assert!(attempt.reject("late").is_err());
        assert!(attempt.reason().is_none());
    }

    #[test]
    fn terminal_states_have_no_exits() {
        assert!(ScheduleState::Dispatched.is_terminal());
        assert!(ScheduleState::Rejected.is_terminal());
        assert!(!ScheduleState::Requested.is_terminal());
    }
}
