//! Read-only status reporting across every stored task.

use crate::task::{
    domain::{TaskKey, TaskRecord, TaskStatus},
    ports::{ScanEntry, TaskStore, TaskStoreResult},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Default size of the recent activity window.
pub const DEFAULT_ACTIVITY_LIMIT: usize = 20;

/// Restricts which tasks a report covers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    statuses: BTreeSet<TaskStatus>,
    participant: Option<String>,
}

impl ReportFilter {
    /// Creates a filter matching every task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the report to tasks currently in one of `statuses`.
    ///
    /// An empty set matches every status.
    #[must_use]
    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = TaskStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    /// Restricts the report to tasks owned or reviewed by `participant`.
    #[must_use]
    pub fn with_participant(mut self, participant: impl Into<String>) -> Self {
        self.participant = Some(participant.into());
        self
    }

    /// Returns whether `record` passes the filter.
    #[must_use]
    pub fn matches(&self, record: &TaskRecord) -> bool {
        let status_matches = self.statuses.is_empty() || self.statuses.contains(&record.status);
        let participant_matches = self
            .participant
            .as_deref()
            .is_none_or(|participant| record.involves(participant));
        status_matches && participant_matches
    }
}

/// The latest transition of one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    /// Task the transition belongs to.
    pub task_key: TaskKey,
    /// `FROM -> TO` summary.
    pub action: String,
    /// Actor that made the transition.
    pub by: String,
    /// When the transition happened.
    pub time: DateTime<Utc>,
    /// Notes attached to the transition.
    pub notes: String,
}

/// A task waiting on requested changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedTask {
    /// Blocked task.
    pub task_key: TaskKey,
    /// Always `CHANGES_REQUESTED`.
    pub status: TaskStatus,
    /// Owner to chase, if recorded.
    pub owner: Option<String>,
    /// Last mutation time, if recorded.
    pub last_update: Option<DateTime<Utc>>,
}

/// Aggregate figures for a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    /// Records found in the store, readable or not.
    pub total_records: usize,
    /// Records that parsed and passed the filter.
    pub valid_tasks: usize,
    /// Records skipped because they could not be read.
    pub skipped_records: usize,
    /// Most frequent status among reported tasks.
    pub most_common_status: Option<TaskStatus>,
    /// Number of blocked tasks.
    pub blocked_count: usize,
    /// Number of activity entries returned.
    pub recent_activity_count: usize,
}

/// Status breakdown, blocked tasks, and recent activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    /// Number of tasks covered.
    pub total_tasks: usize,
    /// Task count per current status.
    pub status_breakdown: BTreeMap<TaskStatus, usize>,
    /// Latest transition per task, newest first, capped to the window.
    pub recent_activity: Vec<ActivityEntry>,
    /// Tasks currently in `CHANGES_REQUESTED`.
    pub blocked_tasks: Vec<BlockedTask>,
    /// Aggregate figures.
    pub summary: ReportSummary,
}

/// Scans the store and aggregates status information.
///
/// Holds no mutation capability; unreadable records are skipped.
#[derive(Clone)]
pub struct ReportAggregator<R>
where
    R: TaskStore,
{
    store: Arc<R>,
    activity_limit: usize,
}

impl<R> ReportAggregator<R>
where
    R: TaskStore,
{
    /// Creates an aggregator with the default activity window.
    #[must_use]
    pub const fn new(store: Arc<R>) -> Self {
        Self {
            store,
            activity_limit: DEFAULT_ACTIVITY_LIMIT,
        }
    }

    /// Overrides the activity window size.
    #[must_use]
    pub const fn with_activity_limit(mut self, activity_limit: usize) -> Self {
        self.activity_limit = activity_limit;
        self
    }

    /// Builds a report over every task matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns a store error only when the store cannot be enumerated at
    /// all; individual unreadable records are counted and skipped.
    pub async fn generate(&self, filter: &ReportFilter) -> TaskStoreResult<StatusReport> {
        let entries = self.store.scan().await?;
        let total_records = entries.len();
        let mut skipped_records = 0;
        let mut status_breakdown: BTreeMap<TaskStatus, usize> = BTreeMap::new();
        let mut recent_activity = Vec::new();
        let mut blocked_tasks = Vec::new();

        for entry in entries {
            let record = match entry {
                ScanEntry::Parsed(record) => record,
                ScanEntry::Malformed { source, reason } => {
                    tracing::debug!(%source, %reason, "report skipped record");
                    skipped_records += 1;
                    continue;
                }
            };
            if !filter.matches(&record) {
                continue;
            }

            *status_breakdown.entry(record.status).or_insert(0) += 1;
            if let Some(latest) = record.latest_review() {
                recent_activity.push(ActivityEntry {
                    task_key: record.task_key.clone(),
                    action: format!("{} -> {}", latest.from, latest.to),
                    by: latest.by.clone(),
                    time: latest.time,
                    notes: latest.notes.clone(),
                });
            }
            if record.status == TaskStatus::ChangesRequested {
                blocked_tasks.push(BlockedTask {
                    task_key: record.task_key,
                    status: record.status,
                    owner: record.owner,
                    last_update: record.updated_at,
                });
            }
        }

        recent_activity.sort_by(|left, right| right.time.cmp(&left.time));
        recent_activity.truncate(self.activity_limit);

        let total_tasks: usize = status_breakdown.values().sum();
        let summary = ReportSummary {
            total_records,
            valid_tasks: total_tasks,
            skipped_records,
            most_common_status: most_common(&status_breakdown),
            blocked_count: blocked_tasks.len(),
            recent_activity_count: recent_activity.len(),
        };

        Ok(StatusReport {
            total_tasks,
            status_breakdown,
            recent_activity,
            blocked_tasks,
            summary,
        })
    }
}

/// Returns the status with the highest count; ties go to the status that
/// comes first in lifecycle order.
fn most_common(breakdown: &BTreeMap<TaskStatus, usize>) -> Option<TaskStatus> {
    breakdown
        .iter()
        .fold(None, |best: Option<(TaskStatus, usize)>, (status, count)| {
            match best {
                Some((_, best_count)) if best_count >= *count => best,
                _ => Some((*status, *count)),
            }
        })
        .map(|(status, _)| status)
}
