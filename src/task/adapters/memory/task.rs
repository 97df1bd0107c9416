//! In-memory task store for tests and embedding.

use crate::task::{
    domain::{TaskEntry, TaskKey, TaskRecord},
    ports::{ScanEntry, TaskStore, TaskStoreError, TaskStoreResult},
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory task store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    records: BTreeMap<TaskKey, StoredRecord>,
}

#[derive(Debug, Clone)]
enum StoredRecord {
    Parsed(TaskRecord),
    Malformed(String),
}

impl InMemoryTaskStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the entry for `task_key` with an unparseable record.
    ///
    /// Mirrors a hand-edited document that no longer parses.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the lock is poisoned.
    pub fn insert_malformed(
        &self,
        task_key: TaskKey,
        reason: impl Into<String>,
    ) -> TaskStoreResult<()> {
        let mut state = self.state.write().map_err(|err| poisoned(&err))?;
        state
            .records
            .insert(task_key, StoredRecord::Malformed(reason.into()));
        Ok(())
    }

    /// Stores `record` verbatim, bypassing version checks.
    ///
    /// Mirrors an external tool writing the record directly.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the lock is poisoned.
    pub fn insert_raw(&self, record: TaskRecord) -> TaskStoreResult<()> {
        let mut state = self.state.write().map_err(|err| poisoned(&err))?;
        state
            .records
            .insert(record.task_key.clone(), StoredRecord::Parsed(record));
        Ok(())
    }
}

fn poisoned(err: &impl std::fmt::Display) -> TaskStoreError {
    TaskStoreError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn load(&self, task_key: &TaskKey) -> TaskStoreResult<TaskEntry> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        match state.records.get(task_key) {
            None => Ok(TaskEntry::Absent(task_key.clone())),
            Some(StoredRecord::Parsed(record)) => Ok(TaskEntry::Present(record.clone())),
            Some(StoredRecord::Malformed(reason)) => Err(TaskStoreError::Malformed {
                task_key: task_key.clone(),
                reason: reason.clone(),
            }),
        }
    }

    async fn save(
        &self,
        record: &TaskRecord,
        expected_version: u64,
    ) -> TaskStoreResult<TaskRecord> {
        let mut state = self.state.write().map_err(|err| poisoned(&err))?;
        let found = match state.records.get(&record.task_key) {
            None => 0,
            Some(StoredRecord::Parsed(existing)) => existing.version,
            Some(StoredRecord::Malformed(reason)) => {
                return Err(TaskStoreError::Malformed {
                    task_key: record.task_key.clone(),
                    reason: reason.clone(),
                });
            }
        };
        if found != expected_version {
            return Err(TaskStoreError::VersionConflict {
                task_key: record.task_key.clone(),
                expected: expected_version,
                found,
            });
        }

        let mut stored = record.clone();
        stored.version = expected_version + 1;
        state.records.insert(
            stored.task_key.clone(),
            StoredRecord::Parsed(stored.clone()),
        );
        Ok(stored)
    }

    async fn scan(&self) -> TaskStoreResult<Vec<ScanEntry>> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        Ok(state
            .records
            .iter()
            .map(|(task_key, stored)| match stored {
                StoredRecord::Parsed(record) => ScanEntry::Parsed(record.clone()),
                StoredRecord::Malformed(reason) => ScanEntry::Malformed {
                    source: task_key.to_string(),
                    reason: reason.clone(),
                },
            })
            .collect())
    }
}
