//! Store port for task record persistence.

use crate::task::domain::{TaskEntry, TaskKey, TaskRecord, TaskStatus};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// One item produced by a full store scan.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEntry {
    /// A record that parsed successfully.
    Parsed(TaskRecord),
    /// A record that could not be read or parsed.
    Malformed {
        /// Where the record came from (file name or key).
        source: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Task persistence contract.
///
/// Stores are keyed, durable, and assume a single writer per key; the
/// version stamp passed to [`TaskStore::save`] turns a lost update into a
/// reported conflict.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Loads the record for `task_key`.
    ///
    /// A key that was never saved yields [`TaskEntry::Absent`]; this is not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Malformed`] when persisted data exists but
    /// cannot be parsed, or [`TaskStoreError::Persistence`] when the medium
    /// cannot be read.
    async fn load(&self, task_key: &TaskKey) -> TaskStoreResult<TaskEntry>;

    /// Persists `record` if the stored version still equals
    /// `expected_version` (zero for a record that was never saved).
    ///
    /// Returns the record as stored, with its version incremented.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::VersionConflict`] when another writer saved
    /// in between, or [`TaskStoreError::Persistence`] when the medium cannot
    /// be written. The previously stored record is retained on failure.
    async fn save(&self, record: &TaskRecord, expected_version: u64)
    -> TaskStoreResult<TaskRecord>;

    /// Reads every stored record, reporting unreadable ones individually.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] only when the store as a whole
    /// cannot be enumerated.
    async fn scan(&self) -> TaskStoreResult<Vec<ScanEntry>>;
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// The persisted record exists but cannot be parsed.
    #[error("malformed record for task {task_key}: {reason}")]
    Malformed {
        /// Task whose record is malformed.
        task_key: TaskKey,
        /// Parser diagnostic.
        reason: String,
    },

    /// The record changed since it was loaded.
    #[error("version conflict for task {task_key}: expected version {expected}, found {found}")]
    VersionConflict {
        /// Task whose record changed.
        task_key: TaskKey,
        /// Version the writer loaded.
        expected: u64,
        /// Version currently stored.
        found: u64,
    },

    /// The write returned but the persisted status is not what was written.
    #[error("write verification failed for task {task_key}: expected {expected}, persisted {persisted}")]
    WriteVerificationFailed {
        /// Task that was written.
        task_key: TaskKey,
        /// Status that was written.
        expected: TaskStatus,
        /// Status read back.
        persisted: TaskStatus,
    },

    /// Medium-level failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
