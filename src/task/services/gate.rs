//! Read-only status gates guarding downstream actions.

use super::FailureKind;
use crate::task::{
    domain::{GateError, TaskDomainError, TaskKey, TaskStatus},
    ports::{TaskStore, TaskStoreError},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Work that may only run once a task has cleared review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownstreamAction {
    /// Generating API test cases for the task.
    TestCaseGeneration,
    /// Producing database verification statements.
    DatabaseVerification,
    /// Writing the integration guide.
    IntegrationDocumentation,
    /// Publishing the task to the issue tracker.
    TicketPublication,
}

impl DownstreamAction {
    /// Every gated action.
    pub const ALL: [Self; 4] = [
        Self::TestCaseGeneration,
        Self::DatabaseVerification,
        Self::IntegrationDocumentation,
        Self::TicketPublication,
    ];

    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TestCaseGeneration => "test_case_generation",
            Self::DatabaseVerification => "database_verification",
            Self::IntegrationDocumentation => "integration_documentation",
            Self::TicketPublication => "ticket_publication",
        }
    }

    /// Returns the minimum status the action requires.
    #[must_use]
    pub const fn required_status(self) -> TaskStatus {
        match self {
            Self::TestCaseGeneration
            | Self::DatabaseVerification
            | Self::IntegrationDocumentation
            | Self::TicketPublication => TaskStatus::Approved,
        }
    }
}

impl fmt::Display for DownstreamAction {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for DownstreamAction {
    type Error = TaskGateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == normalized)
            .ok_or_else(|| TaskGateError::UnknownAction(value.to_owned()))
    }
}

/// Errors returned by gate checks.
#[derive(Debug, Error)]
pub enum TaskGateError {
    /// The task has not reached the required status.
    #[error(transparent)]
    Blocked(#[from] GateError),

    /// A named downstream action was refused.
    #[error("{action} refused: {source}")]
    ActionBlocked {
        /// Action that was refused.
        action: DownstreamAction,
        /// Underlying gate failure.
        source: GateError,
    },

    /// The action name is not recognised.
    #[error("unknown downstream action: {0}")]
    UnknownAction(String),

    /// The task key was invalid.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// The task record could not be read.
    #[error(transparent)]
    Store(#[from] TaskStoreError),
}

impl TaskGateError {
    /// Returns the gate failure, if the error is one.
    #[must_use]
    pub const fn gate_error(&self) -> Option<&GateError> {
        match self {
            Self::Blocked(source) | Self::ActionBlocked { source, .. } => Some(source),
            Self::UnknownAction(_) | Self::Domain(_) | Self::Store(_) => None,
        }
    }

    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Blocked(_) | Self::ActionBlocked { .. } => FailureKind::Gate,
            Self::UnknownAction(_) | Self::Domain(_) => FailureKind::InvalidRequest,
            Self::Store(_) => FailureKind::Persistence,
        }
    }
}

/// Result type for gate checks.
pub type TaskGateResult<T> = Result<T, TaskGateError>;

/// Precondition checks consulted before any downstream generator runs.
///
/// Gates never mutate the store.
#[derive(Clone)]
pub struct TaskGate<R>
where
    R: TaskStore,
{
    store: Arc<R>,
}

impl<R> TaskGate<R>
where
    R: TaskStore,
{
    /// Creates a gate over `store`.
    #[must_use]
    pub const fn new(store: Arc<R>) -> Self {
        Self { store }
    }

    /// Requires the task's status rank to be at least `minimum`'s.
    ///
    /// Returns the current status on success.
    ///
    /// # Errors
    ///
    /// Returns [`TaskGateError::Blocked`] naming the current and required
    /// status when the rank is too low, or a domain/store error when the key
    /// is invalid or the record unreadable.
    pub async fn require_minimum(
        &self,
        task_key: &str,
        minimum: TaskStatus,
    ) -> TaskGateResult<TaskStatus> {
        let key = TaskKey::new(task_key)?;
        let current = self.store.load(&key).await?.status();
        if current.satisfies(minimum) {
            return Ok(current);
        }

        tracing::debug!(task_key = %key, %current, required = %minimum, "gate closed");
        Err(GateError {
            task_key: key,
            current,
            required: minimum,
        }
        .into())
    }

    /// Authorizes `action` for the task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskGateError::ActionBlocked`] when the task has not reached
    /// the action's required status, or a domain/store error.
    pub async fn authorize(
        &self,
        task_key: &str,
        action: DownstreamAction,
    ) -> TaskGateResult<TaskStatus> {
        match self.require_minimum(task_key, action.required_status()).await {
            Err(TaskGateError::Blocked(source)) => {
                Err(TaskGateError::ActionBlocked { action, source })
            }
            other => other,
        }
    }
}
