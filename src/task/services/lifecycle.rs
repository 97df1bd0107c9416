//! Service layer for validated review status transitions.

use crate::task::{
    domain::{
        AuditEntry, ParseTaskStatusError, StatusStats, TaskDomainError, TaskEntry, TaskKey,
        TaskRecord, TaskStatus, TransitionRecord, append, validate_transition,
    },
    ports::{TaskStore, TaskStoreError},
};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Request payload for moving a task to a new status.
///
/// Fields missing from a decoded request are left empty and rejected by
/// [`TaskLifecycleService::transition`], so one incomplete item in an
/// operations file fails alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionTaskRequest {
    #[serde(default)]
    task_key: String,
    #[serde(default, rename = "newStatus")]
    target_status: String,
    #[serde(default)]
    by: String,
    #[serde(default)]
    notes: String,
}

impl TransitionTaskRequest {
    /// Creates a transition request without notes.
    #[must_use]
    pub fn new(
        task_key: impl Into<String>,
        target_status: impl Into<String>,
        by: impl Into<String>,
    ) -> Self {
        Self {
            task_key: task_key.into(),
            target_status: target_status.into(),
            by: by.into(),
            notes: String::new(),
        }
    }

    /// Sets the justification notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Returns the raw task key.
    #[must_use]
    pub fn task_key(&self) -> &str {
        &self.task_key
    }

    /// Returns the raw requested status.
    #[must_use]
    pub fn target_status(&self) -> &str {
        &self.target_status
    }

    /// Returns the requesting actor.
    #[must_use]
    pub fn by(&self) -> &str {
        &self.by
    }
}

/// Result of a successful transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionOutcome {
    /// Task that moved.
    pub task_key: TaskKey,
    /// Status before the transition.
    pub old_status: TaskStatus,
    /// Status after the transition.
    pub new_status: TaskStatus,
    /// Record as persisted.
    pub record: TaskRecord,
}

/// Options controlling what [`TaskLifecycleService::query`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Include the transition history, newest first.
    pub include_history: bool,
    /// Include the status statistics.
    pub include_stats: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            include_history: true,
            include_stats: true,
        }
    }
}

/// Read-only view of a task's lifecycle position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusView {
    /// Task being described.
    pub task_key: TaskKey,
    /// Whether a record has been persisted for the task.
    pub exists: bool,
    /// Current effective status.
    pub current_status: TaskStatus,
    /// Statuses the task may move to next.
    pub allowed_transitions: Vec<TaskStatus>,
    /// Number of recorded transitions.
    pub history_count: usize,
    /// Transition history, newest first, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<TransitionRecord>>,
    /// Status statistics recomputed from history, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatusStats>,
}

/// Error taxonomy shared by every governance operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// Illegal state change; retry with a listed target.
    TransitionRejected,
    /// Critical transition without notes; retry with notes.
    JustificationRequired,
    /// Downstream action attempted too early.
    Gate,
    /// The store could not durably record or read a change.
    Persistence,
    /// The request itself was malformed.
    InvalidRequest,
}

/// Service-level errors for lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// The requested status is not a lifecycle status.
    #[error(transparent)]
    InvalidStatus(#[from] ParseTaskStatusError),
    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] TaskStoreError),
}

impl TaskLifecycleError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Domain(TaskDomainError::TransitionRejected { .. }) => {
                FailureKind::TransitionRejected
            }
            Self::Domain(TaskDomainError::JustificationRequired { .. }) => {
                FailureKind::JustificationRequired
            }
            Self::Domain(_) | Self::InvalidStatus(_) => FailureKind::InvalidRequest,
            Self::Store(_) => FailureKind::Persistence,
        }
    }
}

/// Result type for lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Lifecycle orchestration service.
///
/// Every status mutation goes through [`TaskLifecycleService::transition`].
#[derive(Clone)]
pub struct TaskLifecycleService<R, C>
where
    R: TaskStore,
    C: Clock + Send + Sync,
{
    store: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> TaskLifecycleService<R, C>
where
    R: TaskStore,
    C: Clock + Send + Sync,
{
    /// Creates a new lifecycle service.
    #[must_use]
    pub const fn new(store: Arc<R>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &Arc<R> {
        &self.store
    }

    /// Loads the entry for `task_key`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for an invalid key or
    /// [`TaskLifecycleError::Store`] when the record cannot be read.
    pub async fn load(&self, task_key: &str) -> TaskLifecycleResult<TaskEntry> {
        let key = TaskKey::new(task_key)?;
        Ok(self.store.load(&key).await?)
    }

    /// Moves a task to a new status.
    ///
    /// The transition is validated against the lifecycle graph, appended to
    /// the audit trail, persisted with a version check, and read back to
    /// confirm the stored status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TransitionRejected`] or
    /// [`TaskDomainError::JustificationRequired`] (wrapped in
    /// [`TaskLifecycleError::Domain`]) without touching the store, and
    /// [`TaskLifecycleError::Store`] when persistence or the read-back check
    /// fails. The previously stored record is retained on every failure.
    pub async fn transition(
        &self,
        request: TransitionTaskRequest,
    ) -> TaskLifecycleResult<TransitionOutcome> {
        let TransitionTaskRequest {
            task_key: raw_key,
            target_status,
            by,
            notes,
        } = request;
        let task_key = TaskKey::new(raw_key)?;
        let target = TaskStatus::try_from(target_status.as_str())?;
        let actor = by.trim();
        if actor.is_empty() {
            return Err(TaskDomainError::MissingActor.into());
        }

        let entry = self.store.load(&task_key).await?;
        let current = entry.status();
        let expected_version = entry.version();

        if let Err(err) = validate_transition(&task_key, current, target, &notes) {
            tracing::warn!(
                task_key = %task_key,
                from = %current,
                to = %target,
                by = actor,
                error = %err,
                "transition rejected"
            );
            return Err(err.into());
        }

        let next = append(
            AuditEntry::new(actor, current, target, notes),
            entry.into_record(),
            &*self.clock,
        );
        let stored = self.store.save(&next, expected_version).await?;

        let persisted = self.store.load(&task_key).await?.status();
        if persisted != target {
            tracing::error!(
                task_key = %task_key,
                expected = %target,
                persisted = %persisted,
                "persisted status does not match written status"
            );
            return Err(TaskStoreError::WriteVerificationFailed {
                task_key,
                expected: target,
                persisted,
            }
            .into());
        }

        tracing::info!(
            task_key = %task_key,
            from = %current,
            to = %target,
            by = actor,
            version = stored.version,
            "task transitioned"
        );
        Ok(TransitionOutcome {
            task_key,
            old_status: current,
            new_status: target,
            record: stored,
        })
    }

    /// Describes a task's current status, next steps, and history.
    ///
    /// Statistics are recomputed from history rather than read from the
    /// denormalised counters.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for an invalid key or
    /// [`TaskLifecycleError::Store`] when the record cannot be read.
    pub async fn query(
        &self,
        task_key: &str,
        options: QueryOptions,
    ) -> TaskLifecycleResult<TaskStatusView> {
        let entry = self.load(task_key).await?;
        let exists = entry.is_present();
        let current_status = entry.status();
        let record = entry.into_record();

        let history = options.include_history.then(|| {
            let mut newest_first = record.reviews.clone();
            newest_first.sort_by(|left, right| right.time.cmp(&left.time));
            newest_first
        });
        let stats = options
            .include_stats
            .then(|| StatusStats::recompute(&record.reviews));

        Ok(TaskStatusView {
            task_key: record.task_key,
            exists,
            current_status,
            allowed_transitions: current_status.allowed_transitions().to_vec(),
            history_count: record.reviews.len(),
            history,
            stats,
        })
    }
}
