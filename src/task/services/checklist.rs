//! Consistency checks over a single task record.

use crate::task::{
    domain::{TaskDomainError, TaskEntry, TaskKey},
    ports::{TaskStore, TaskStoreError},
};
use serde::Serialize;
use std::sync::Arc;

/// A named consistency check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistCheck {
    /// A record has been persisted for the task.
    RecordExists,
    /// The current status equals the last history entry's target.
    StatusValid,
    /// Every history entry was written by the lifecycle engine.
    HistoryValidated,
    /// Persisted statistics equal a recomputation from history.
    StatsConsistent,
    /// Owner and title metadata are present.
    RequiredFields,
}

impl ChecklistCheck {
    /// Every supported check.
    pub const ALL: [Self; 5] = [
        Self::RecordExists,
        Self::StatusValid,
        Self::HistoryValidated,
        Self::StatsConsistent,
        Self::RequiredFields,
    ];

    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RecordExists => "record_exists",
            Self::StatusValid => "status_valid",
            Self::HistoryValidated => "history_validated",
            Self::StatsConsistent => "stats_consistent",
            Self::RequiredFields => "required_fields",
        }
    }

    /// Parses a check name.
    ///
    /// The older ids `task_doc_exists` and `front_matter_valid` map to
    /// [`Self::RecordExists`] and [`Self::RequiredFields`].
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "task_doc_exists" => Some(Self::RecordExists),
            "front_matter_valid" => Some(Self::RequiredFields),
            canonical => Self::ALL
                .into_iter()
                .find(|check| check.as_str() == canonical),
        }
    }
}

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistFailure {
    /// Check name as requested.
    pub check: String,
    /// Why the check failed.
    pub reason: String,
}

/// Outcome of running a checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistOutcome {
    /// Whether every requested check passed.
    pub passed: bool,
    /// Failed checks in request order.
    pub failed_items: Vec<ChecklistFailure>,
}

/// Runs consistency checks against stored task records.
#[derive(Clone)]
pub struct ChecklistService<R>
where
    R: TaskStore,
{
    store: Arc<R>,
}

impl<R> ChecklistService<R>
where
    R: TaskStore,
{
    /// Creates a checklist service over `store`.
    #[must_use]
    pub const fn new(store: Arc<R>) -> Self {
        Self { store }
    }

    /// Runs `checks` against the record for `task_key`.
    ///
    /// Unknown check names and unreadable records become failed items
    /// rather than errors.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTaskKey`] when the key is invalid.
    pub async fn run<S: AsRef<str>>(
        &self,
        task_key: &str,
        checks: &[S],
    ) -> Result<ChecklistOutcome, TaskDomainError> {
        let key = TaskKey::new(task_key)?;
        let loaded = self.store.load(&key).await;

        let failed_items: Vec<ChecklistFailure> = checks
            .iter()
            .filter_map(|name| {
                let requested = name.as_ref();
                let reason = match ChecklistCheck::parse(requested) {
                    None => Some(format!("unknown check: {requested}")),
                    Some(check) => evaluate(check, &loaded),
                };
                reason.map(|failure_reason| ChecklistFailure {
                    check: requested.to_owned(),
                    reason: failure_reason,
                })
            })
            .collect();

        Ok(ChecklistOutcome {
            passed: failed_items.is_empty(),
            failed_items,
        })
    }
}

/// Returns the failure reason, or `None` when the check passes.
fn evaluate(check: ChecklistCheck, loaded: &Result<TaskEntry, TaskStoreError>) -> Option<String> {
    let record = match loaded {
        Err(err) => return Some(format!("record unreadable: {err}")),
        Ok(TaskEntry::Absent(task_key)) => {
            return Some(format!("no record persisted for task {task_key}"));
        }
        Ok(TaskEntry::Present(record)) => record,
    };

    match check {
        ChecklistCheck::RecordExists => None,
        ChecklistCheck::StatusValid => (!record.status_matches_history()).then(|| {
            format!(
                "status {} does not match last history entry",
                record.status
            )
        }),
        ChecklistCheck::HistoryValidated => {
            let unvalidated = record.reviews.iter().filter(|review| !review.valid).count();
            (unvalidated > 0)
                .then(|| format!("{unvalidated} history entries were not written by the engine"))
        }
        ChecklistCheck::StatsConsistent => (!record.stats_consistent())
            .then(|| "status statistics differ from recorded history".to_owned()),
        ChecklistCheck::RequiredFields => {
            let missing: Vec<&str> = [
                ("owner", record.owner.is_none()),
                ("title", record.title.is_none()),
            ]
            .into_iter()
            .filter_map(|(field, is_missing)| is_missing.then_some(field))
            .collect();
            (!missing.is_empty()).then(|| format!("missing fields: {}", missing.join(", ")))
        }
    }
}
