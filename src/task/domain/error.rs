//! Error types for task domain validation and parsing.

use super::{TaskKey, TaskStatus};
use thiserror::Error;

/// Errors returned by domain-level lifecycle rules.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task key cannot identify a record.
    #[error("invalid task key '{0}'")]
    InvalidTaskKey(String),

    /// The transition actor was blank.
    #[error("transition actor must not be empty")]
    MissingActor,

    /// The requested transition is not part of the lifecycle graph.
    #[error("illegal transition {from} -> {to} for task {task_key}; allowed: {}", format_allowed(.allowed))]
    TransitionRejected {
        /// Task the transition was requested for.
        task_key: TaskKey,
        /// Status the task is currently in.
        from: TaskStatus,
        /// Status that was requested.
        to: TaskStatus,
        /// Every status reachable from `from`.
        allowed: Vec<TaskStatus>,
    },

    /// A critical transition was requested without a justification.
    #[error("transition {from} -> {to} for task {task_key} requires a justification")]
    JustificationRequired {
        /// Task the transition was requested for.
        task_key: TaskKey,
        /// Status the task is currently in.
        from: TaskStatus,
        /// Status that was requested.
        to: TaskStatus,
    },
}

/// Error returned when a gated action is attempted too early in the
/// lifecycle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("action not allowed for task {task_key}: requires {required} or later, current status is {current}")]
pub struct GateError {
    /// Task the gate was evaluated for.
    pub task_key: TaskKey,
    /// Status the task is currently in.
    pub current: TaskStatus,
    /// Minimum status the action requires.
    pub required: TaskStatus,
}

/// Error returned while parsing task statuses from requests or persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

fn format_allowed(allowed: &[TaskStatus]) -> String {
    if allowed.is_empty() {
        return "none (terminal)".to_owned();
    }
    allowed
        .iter()
        .map(|status| status.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
