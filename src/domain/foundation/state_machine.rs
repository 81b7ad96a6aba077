//! State machine trait for short-lived operation states.
//!
//! Entity lifecycles (jobs, experiments) are recorded in status ledgers and
//! classified by the lifecycle registry. Operations with a fixed, small set
//! of transitions, such as a single scheduling attempt, implement this trait
//! instead.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// Implementors list their outgoing transitions; validated transitions and
/// terminal detection come for free.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Gate {
        Closed,
        Open,
        Sealed,
    }

    impl StateMachine for Gate {
        fn valid_transitions(&self) -> Vec<Self> {
            match self {
                Gate::Closed => vec![Gate::Open, Gate::Sealed],
                Gate::Open => vec![Gate::Closed],
                Gate::Sealed => vec![],
            }
        }
    }

    #[test]
    fn transition_to_succeeds_for_valid_transition() {
        assert_eq!(Gate::Closed.transition_to(Gate::Open), Ok(Gate::Open));
    }

    #[test]
    fn transition_to_fails_for_invalid_transition() {
        let result = Gate::Open.transition_to(Gate::Sealed);
        assert!(matches!(
            result,
            Err(ValidationError::InvalidFormat { ref field, .. }) if field == "state_transition"
        ));
    }

    #[test]
    fn is_terminal_only_for_states_without_exits() {
        assert!(Gate::Sealed.is_terminal());
        assert!(!Gate::Closed.is_terminal());
        assert!(!Gate::Open.is_terminal());
    }

    #[test]
    fn can_transition_to_is_consistent_with_valid_transitions() {
        for state in [Gate::Closed, Gate::Open, Gate::Sealed] {
            for target in state.valid_transitions() {
                assert!(state.can_transition_to(&target));
            }
        }
    }
}
