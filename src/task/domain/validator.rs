//! Transition legality and justification rules.

use super::{TaskDomainError, TaskKey, TaskStatus};

/// Pure decision function over the fixed lifecycle graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionValidator;

impl TransitionValidator {
    /// Returns whether `from -> to` is an edge of the lifecycle graph.
    #[must_use]
    pub const fn is_legal(from: TaskStatus, to: TaskStatus) -> bool {
        from.can_transition_to(to)
    }

    /// Returns whether `from -> to` needs a non-blank justification.
    #[must_use]
    pub const fn requires_justification(from: TaskStatus, to: TaskStatus) -> bool {
        from.requires_justification(to)
    }
}

/// Validates a requested transition for `task_key`.
///
/// Notes made only of whitespace count as missing.
///
/// # Errors
///
/// Returns [`TaskDomainError::TransitionRejected`] with the full allowed set
/// when the edge does not exist, or
/// [`TaskDomainError::JustificationRequired`] when a critical transition has
/// blank notes.
pub fn validate_transition(
    task_key: &TaskKey,
    from: TaskStatus,
    to: TaskStatus,
    notes: &str,
) -> Result<(), TaskDomainError> {
    if !TransitionValidator::is_legal(from, to) {
        return Err(TaskDomainError::TransitionRejected {
            task_key: task_key.clone(),
            from,
            to,
            allowed: from.allowed_transitions().to_vec(),
        });
    }

    if TransitionValidator::requires_justification(from, to) && notes.trim().is_empty() {
        return Err(TaskDomainError::JustificationRequired {
            task_key: task_key.clone(),
            from,
            to,
        });
    }

    Ok(())
}
