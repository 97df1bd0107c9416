//! Persisted task record, transition history, and derived statistics.

use super::{TaskKey, TaskStatus, timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One audited status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Actor that requested the transition.
    pub by: String,
    /// Status before the transition.
    pub from: TaskStatus,
    /// Status after the transition.
    pub to: TaskStatus,
    /// Free-text justification; mandatory for critical transitions.
    #[serde(default)]
    pub notes: String,
    /// When the transition was recorded.
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub time: DateTime<Utc>,
    /// Whether the entry was written by the lifecycle engine.
    ///
    /// Entries added by hand or by other tools deserialize with `false`.
    #[serde(default)]
    pub valid: bool,
}

/// Per-status occurrence counts plus a running transition total.
///
/// Persisted as one flat mapping, e.g.
/// `{PENDING_REVIEW: 2, APPROVED: 1, totalTransitions: 3}`. Derived from the
/// history; [`StatusStats::recompute`] is the authoritative value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusStats {
    /// Number of transitions that landed on each status.
    #[serde(flatten)]
    pub counts: BTreeMap<TaskStatus, u64>,
    /// Number of transitions recorded.
    #[serde(default)]
    pub total_transitions: u64,
}

impl StatusStats {
    /// Recomputes statistics from a transition history.
    #[must_use]
    pub fn recompute(reviews: &[TransitionRecord]) -> Self {
        reviews.iter().fold(Self::default(), |mut stats, review| {
            stats.record(review.to);
            stats
        })
    }

    /// Counts one transition landing on `status`.
    pub fn record(&mut self, status: TaskStatus) {
        *self.counts.entry(status).or_insert(0) += 1;
        self.total_transitions += 1;
    }

    /// Returns how many transitions landed on `status`.
    #[must_use]
    pub fn count(&self, status: TaskStatus) -> u64 {
        self.counts.get(&status).copied().unwrap_or_default()
    }
}

/// The unit governed by the lifecycle engine.
///
/// Fields are public because the record is a persisted document shared with
/// other tools; mutation of `status` and `reviews` must go through the
/// lifecycle service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    /// Immutable task identifier.
    pub task_key: TaskKey,
    /// Optional human-readable title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Current lifecycle status.
    #[serde(default = "default_status")]
    pub status: TaskStatus,
    /// Informational owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Informational reviewers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reviewers: Vec<String>,
    /// Append-only transition history in chronological order.
    #[serde(default)]
    pub reviews: Vec<TransitionRecord>,
    /// Denormalised statistics over `reviews`.
    #[serde(default)]
    pub status_stats: StatusStats,
    /// Timestamp of the last mutation, if any.
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize_optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency stamp; zero until first saved.
    #[serde(default)]
    pub version: u64,
    /// Metadata keys owned by other tools, preserved verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
    /// Free-form document body.
    #[serde(skip)]
    pub body: String,
}

const fn default_status() -> TaskStatus {
    TaskStatus::Draft
}

impl TaskRecord {
    /// Creates an implicit draft record with no history.
    #[must_use]
    pub fn draft(task_key: TaskKey) -> Self {
        Self {
            task_key,
            title: None,
            status: TaskStatus::Draft,
            owner: None,
            reviewers: Vec::new(),
            reviews: Vec::new(),
            status_stats: StatusStats::default(),
            updated_at: None,
            version: 0,
            extra: BTreeMap::new(),
            body: String::new(),
        }
    }

    /// Returns the most recent transition by time, if any.
    ///
    /// Ties resolve to the entry appended last.
    #[must_use]
    pub fn latest_review(&self) -> Option<&TransitionRecord> {
        self.reviews
            .iter()
            .enumerate()
            .max_by_key(|(index, review)| (review.time, *index))
            .map(|(_, review)| review)
    }

    /// Returns whether `participant` is the owner or one of the reviewers.
    #[must_use]
    pub fn involves(&self, participant: &str) -> bool {
        self.owner.as_deref() == Some(participant)
            || self.reviewers.iter().any(|reviewer| reviewer == participant)
    }

    /// Returns whether `status` agrees with the last history entry.
    ///
    /// A record without history is consistent by definition.
    #[must_use]
    pub fn status_matches_history(&self) -> bool {
        self.reviews
            .last()
            .is_none_or(|review| review.to == self.status)
    }

    /// Returns whether the persisted statistics equal a recomputation.
    #[must_use]
    pub fn stats_consistent(&self) -> bool {
        self.status_stats == StatusStats::recompute(&self.reviews)
    }
}

/// Result of looking up a task key in a store.
///
/// Distinguishes a task that was never touched from one that was explicitly
/// moved back to `DRAFT`.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEntry {
    /// No record has ever been persisted for the key.
    Absent(TaskKey),
    /// A persisted record exists.
    Present(TaskRecord),
}

impl TaskEntry {
    /// Returns the task key.
    #[must_use]
    pub const fn task_key(&self) -> &TaskKey {
        match self {
            Self::Absent(task_key) => task_key,
            Self::Present(record) => &record.task_key,
        }
    }

    /// Returns the effective status; absent tasks are implicitly `DRAFT`.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        match self {
            Self::Absent(_) => TaskStatus::Draft,
            Self::Present(record) => record.status,
        }
    }

    /// Returns the persisted version, zero when absent.
    #[must_use]
    pub const fn version(&self) -> u64 {
        match self {
            Self::Absent(_) => 0,
            Self::Present(record) => record.version,
        }
    }

    /// Returns whether a record has been persisted.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Returns the persisted record or materialises an implicit draft.
    #[must_use]
    pub fn into_record(self) -> TaskRecord {
        match self {
            Self::Absent(task_key) => TaskRecord::draft(task_key),
            Self::Present(record) => record,
        }
    }
}
