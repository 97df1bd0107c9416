//! File-backed task store.

use super::document::{self, DocumentError};
use crate::task::{
    domain::{TaskEntry, TaskKey, TaskRecord},
    ports::{ScanEntry, TaskStore, TaskStoreError, TaskStoreResult},
};
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::io;
use std::sync::Arc;

const DOCUMENT_EXTENSION: &str = "md";
const TEMP_SUFFIX: &str = ".tmp";

/// Task store persisting one markdown document per task.
///
/// Documents live directly under the configured directory as
/// `<taskKey>.md`. The directory is created on first write.
#[derive(Debug, Clone)]
pub struct FileTaskStore {
    root: Arc<Utf8PathBuf>,
}

impl FileTaskStore {
    /// Creates a store rooted at `tasks_dir`.
    #[must_use]
    pub fn new(tasks_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: Arc::new(tasks_dir.into()),
        }
    }

    /// Returns the directory holding task documents.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn document_name(task_key: &TaskKey) -> String {
        format!("{task_key}.{DOCUMENT_EXTENSION}")
    }

    /// Opens the tasks directory, returning `None` when it does not exist.
    fn open_existing(&self) -> io::Result<Option<Dir>> {
        match Dir::open_ambient_dir(self.root.as_path(), ambient_authority()) {
            Ok(dir) => Ok(Some(dir)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn open_or_create(&self) -> io::Result<Dir> {
        Dir::create_ambient_dir_all(self.root.as_path(), ambient_authority())?;
        Dir::open_ambient_dir(self.root.as_path(), ambient_authority())
    }

    fn load_blocking(&self, task_key: &TaskKey) -> TaskStoreResult<TaskEntry> {
        let Some(dir) = self.open_existing().map_err(TaskStoreError::persistence)? else {
            return Ok(TaskEntry::Absent(task_key.clone()));
        };
        read_entry(&dir, task_key)
    }

    fn save_blocking(
        &self,
        record: &TaskRecord,
        expected_version: u64,
    ) -> TaskStoreResult<TaskRecord> {
        let dir = self.open_or_create().map_err(TaskStoreError::persistence)?;
        let task_key = &record.task_key;
        let found = read_entry(&dir, task_key)?.version();
        if found != expected_version {
            return Err(TaskStoreError::VersionConflict {
                task_key: task_key.clone(),
                expected: expected_version,
                found,
            });
        }

        let mut stored = record.clone();
        stored.version = expected_version + 1;
        if stored.body.is_empty() {
            stored.body = document::default_body(&stored).map_err(encode_failure)?;
        }
        let contents = document::encode(&stored).map_err(encode_failure)?;

        let name = Self::document_name(task_key);
        let temp_name = format!("{name}{TEMP_SUFFIX}");
        dir.write(&temp_name, contents.as_bytes())
            .map_err(TaskStoreError::persistence)?;
        if let Err(err) = dir.rename(&temp_name, &dir, &name) {
            if let Err(cleanup) = dir.remove_file(&temp_name) {
                tracing::warn!(task_key = %task_key, error = %cleanup, "failed to remove temporary task document");
            }
            return Err(TaskStoreError::persistence(err));
        }

        tracing::debug!(
            task_key = %task_key,
            version = stored.version,
            path = %self.root.join(&name),
            "task document written"
        );
        Ok(stored)
    }

    fn scan_blocking(&self) -> TaskStoreResult<Vec<ScanEntry>> {
        let Some(dir) = self.open_existing().map_err(TaskStoreError::persistence)? else {
            return Ok(Vec::new());
        };

        let mut names = Vec::new();
        for entry in dir.entries().map_err(TaskStoreError::persistence)? {
            let file_name = entry
                .and_then(|dir_entry| dir_entry.file_name())
                .map_err(TaskStoreError::persistence)?;
            if Utf8Path::new(&file_name).extension() == Some(DOCUMENT_EXTENSION) {
                names.push(file_name);
            }
        }
        names.sort();

        Ok(names
            .into_iter()
            .map(|file_name| scan_document(&dir, file_name))
            .collect())
    }
}

fn encode_failure(err: DocumentError) -> TaskStoreError {
    TaskStoreError::persistence(err)
}

fn read_entry(dir: &Dir, task_key: &TaskKey) -> TaskStoreResult<TaskEntry> {
    let name = FileTaskStore::document_name(task_key);
    let contents = match dir.read_to_string(&name) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Ok(TaskEntry::Absent(task_key.clone()));
        }
        Err(err) => return Err(TaskStoreError::persistence(err)),
    };

    document::decode(task_key, &contents)
        .map(TaskEntry::Present)
        .map_err(|err| TaskStoreError::Malformed {
            task_key: task_key.clone(),
            reason: err.to_string(),
        })
}

fn scan_document(dir: &Dir, file_name: String) -> ScanEntry {
    let stem = Utf8Path::new(&file_name)
        .file_stem()
        .unwrap_or_default()
        .to_owned();
    let parsed = TaskKey::new(stem)
        .map_err(|err| err.to_string())
        .and_then(|task_key| {
            let contents = dir.read_to_string(&file_name).map_err(|err| err.to_string())?;
            document::decode(&task_key, &contents).map_err(|err| err.to_string())
        });

    match parsed {
        Ok(record) => ScanEntry::Parsed(record),
        Err(reason) => {
            tracing::warn!(document = %file_name, %reason, "skipping unreadable task document");
            ScanEntry::Malformed {
                source: file_name,
                reason,
            }
        }
    }
}

async fn run_blocking<F, T>(f: F) -> TaskStoreResult<T>
where
    F: FnOnce() -> TaskStoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| TaskStoreError::persistence(io::Error::other(format!("task join error: {err}"))))?
}

#[async_trait]
impl TaskStore for FileTaskStore {
    async fn load(&self, task_key: &TaskKey) -> TaskStoreResult<TaskEntry> {
        let store = self.clone();
        let key = task_key.clone();
        run_blocking(move || store.load_blocking(&key)).await
    }

    async fn save(
        &self,
        record: &TaskRecord,
        expected_version: u64,
    ) -> TaskStoreResult<TaskRecord> {
        let store = self.clone();
        let owned = record.clone();
        run_blocking(move || store.save_blocking(&owned, expected_version)).await
    }

    async fn scan(&self) -> TaskStoreResult<Vec<ScanEntry>> {
        let store = self.clone();
        run_blocking(move || store.scan_blocking()).await
    }
}
