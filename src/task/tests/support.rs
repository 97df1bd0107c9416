//! Shared fixtures for task unit tests.

use crate::task::{
    adapters::memory::InMemoryTaskStore,
    domain::{AuditEntry, TaskKey, TaskRecord, TaskStatus, append},
};
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use std::sync::atomic::{AtomicI64, Ordering};

/// Clock that advances one second on every reading.
#[derive(Debug)]
pub struct StepClock {
    next_second: AtomicI64,
}

impl StepClock {
    pub fn starting_at(epoch_seconds: i64) -> Self {
        Self {
            next_second: AtomicI64::new(epoch_seconds),
        }
    }
}

impl Default for StepClock {
    fn default() -> Self {
        Self::starting_at(1_700_000_000)
    }
}

impl Clock for StepClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let seconds = self.next_second.fetch_add(1, Ordering::SeqCst);
        Utc.timestamp_opt(seconds, 0)
            .single()
            .expect("step clock timestamp should be valid")
    }
}

pub fn key(value: &str) -> TaskKey {
    TaskKey::new(value).expect("test task key should be valid")
}

/// Builds a record that walked `path` from `DRAFT`, one transition per step.
pub fn record_through(task_key: &str, path: &[TaskStatus], clock: &StepClock) -> TaskRecord {
    path.iter()
        .fold(TaskRecord::draft(key(task_key)), |record, target| {
            let from = record.status;
            append(
                AuditEntry::new("seed", from, *target, "seeded"),
                record,
                clock,
            )
        })
}

/// Stores a record that walked `path`, bypassing the lifecycle service.
pub fn seed(store: &InMemoryTaskStore, task_key: &str, path: &[TaskStatus], clock: &StepClock) {
    let mut record = record_through(task_key, path, clock);
    record.version = 1;
    store
        .insert_raw(record)
        .expect("seeding the in-memory store should succeed");
}

/// Returns the shortest lifecycle path from `DRAFT` to `status`.
pub fn path_to(status: TaskStatus) -> Vec<TaskStatus> {
    match status {
        TaskStatus::Draft => vec![],
        TaskStatus::PendingReview => vec![TaskStatus::PendingReview],
        TaskStatus::ChangesRequested => {
            vec![TaskStatus::PendingReview, TaskStatus::ChangesRequested]
        }
        TaskStatus::Approved => vec![TaskStatus::PendingReview, TaskStatus::Approved],
        TaskStatus::Published => vec![
            TaskStatus::PendingReview,
            TaskStatus::Approved,
            TaskStatus::Published,
        ],
    }
}
