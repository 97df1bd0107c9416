//! Append-only audit trail for task transitions.

use super::{TaskRecord, TaskStatus, TransitionRecord};
use mockable::Clock;

/// A validated transition waiting to be written into a record's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    /// Actor requesting the transition.
    pub by: String,
    /// Status before the transition.
    pub from: TaskStatus,
    /// Status after the transition.
    pub to: TaskStatus,
    /// Justification text, possibly empty.
    pub notes: String,
}

impl AuditEntry {
    /// Creates an audit entry.
    #[must_use]
    pub fn new(
        by: impl Into<String>,
        from: TaskStatus,
        to: TaskStatus,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            by: by.into(),
            from,
            to,
            notes: notes.into(),
        }
    }
}

/// Produces a new record with `entry` appended to the history.
///
/// The returned record carries `status = entry.to`, statistics incremented
/// for the new status and the running total, and a refreshed `updated_at`.
/// Prior history entries are moved over untouched; nothing is removed or
/// reordered.
#[must_use]
pub fn append(entry: AuditEntry, current: TaskRecord, clock: &impl Clock) -> TaskRecord {
    let timestamp = clock.utc();
    let AuditEntry {
        by,
        from,
        to,
        notes,
    } = entry;

    let mut next = current;
    next.reviews.push(TransitionRecord {
        by,
        from,
        to,
        notes,
        time: timestamp,
        valid: true,
    });
    next.status_stats.record(to);
    next.status = to;
    next.updated_at = Some(timestamp);
    next
}
