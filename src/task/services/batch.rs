//! Sequential batch application of transition requests.

use super::{FailureKind, TaskLifecycleError, TaskLifecycleService, TransitionTaskRequest};
use crate::task::{
    domain::{TaskKey, TaskStatus},
    ports::TaskStore,
};
use mockable::Clock;
use serde::{Serialize, Serializer};

/// A batch item that transitioned successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSuccess {
    /// Position of the item in the submitted batch.
    pub index: usize,
    /// Task that moved.
    pub task_key: TaskKey,
    /// Status before the transition.
    pub from: TaskStatus,
    /// Status after the transition.
    pub to: TaskStatus,
    /// Actor recorded for the transition.
    pub by: String,
}

/// A batch item that failed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    /// Position of the item in the submitted batch.
    pub index: usize,
    /// Task key as submitted.
    pub task_key: String,
    /// Classification of the failure.
    pub kind: FailureKind,
    /// The failure itself.
    #[serde(serialize_with = "serialize_error")]
    pub error: TaskLifecycleError,
}

fn serialize_error<S: Serializer>(
    error: &TaskLifecycleError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Item counts for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Number of submitted items, attempted or not.
    pub total: usize,
    /// Number of successful items.
    pub successful: usize,
    /// Number of failed items.
    pub failed: usize,
}

/// Per-item accounting for a batch.
///
/// When a batch halts, items after `halted_at` appear in neither list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    /// Items that transitioned, in input order.
    pub successful: Vec<BatchSuccess>,
    /// Items that failed, in input order.
    pub failed: Vec<BatchFailure>,
    /// Item counts.
    pub summary: BatchSummary,
    /// Index of the failure that stopped the batch, if it stopped early.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub halted_at: Option<usize>,
}

impl BatchResult {
    /// Returns the number of items that were attempted.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.successful.len() + self.failed.len()
    }
}

/// Applies transition requests one after another through the lifecycle
/// service.
#[derive(Clone)]
pub struct BatchCoordinator<R, C>
where
    R: TaskStore,
    C: Clock + Send + Sync,
{
    lifecycle: TaskLifecycleService<R, C>,
}

impl<R, C> BatchCoordinator<R, C>
where
    R: TaskStore,
    C: Clock + Send + Sync,
{
    /// Creates a coordinator over `lifecycle`.
    #[must_use]
    pub const fn new(lifecycle: TaskLifecycleService<R, C>) -> Self {
        Self { lifecycle }
    }

    /// Processes `operations` strictly in input order.
    ///
    /// Each item is an independent transition. A failing item is recorded
    /// with its index; when `continue_on_error` is false the batch stops
    /// right after recording it and the remaining items are left
    /// unprocessed. `summary.total` is always the number of submitted items.
    pub async fn run(
        &self,
        operations: Vec<TransitionTaskRequest>,
        continue_on_error: bool,
    ) -> BatchResult {
        let total = operations.len();
        let mut successful = Vec::new();
        let mut failed = Vec::new();
        let mut halted_at = None;

        for (index, request) in operations.into_iter().enumerate() {
            let submitted_key = request.task_key().to_owned();
            let actor = request.by().trim().to_owned();
            match self.lifecycle.transition(request).await {
                Ok(outcome) => successful.push(BatchSuccess {
                    index,
                    task_key: outcome.task_key,
                    from: outcome.old_status,
                    to: outcome.new_status,
                    by: actor,
                }),
                Err(error) => {
                    tracing::warn!(index, task_key = %submitted_key, %error, "batch item failed");
                    failed.push(BatchFailure {
                        index,
                        task_key: submitted_key,
                        kind: error.kind(),
                        error,
                    });
                    if !continue_on_error {
                        halted_at = Some(index);
                        break;
                    }
                }
            }
        }

        let summary = BatchSummary {
            total,
            successful: successful.len(),
            failed: failed.len(),
        };
        tracing::info!(
            total,
            successful = summary.successful,
            failed = summary.failed,
            halted = halted_at.is_some(),
            "batch finished"
        );
        BatchResult {
            successful,
            failed,
            summary,
            halted_at,
        }
    }
}
