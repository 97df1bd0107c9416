//! Shared world state for review lifecycle BDD scenarios.

use std::sync::Arc;

use devflow::task::{
    adapters::memory::InMemoryTaskStore,
    domain::TaskStatus,
    services::{
        BatchCoordinator, BatchResult, TaskGate, TaskGateResult, TaskLifecycleError,
        TaskLifecycleService, TransitionOutcome,
    },
};
use mockable::DefaultClock;
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestLifecycle = TaskLifecycleService<InMemoryTaskStore, DefaultClock>;

/// Scenario world for review lifecycle behaviour tests.
pub struct ReviewWorld {
    pub store: Arc<InMemoryTaskStore>,
    pub lifecycle: TestLifecycle,
    pub gate: TaskGate<InMemoryTaskStore>,
    pub batch: BatchCoordinator<InMemoryTaskStore, DefaultClock>,
    pub last_transition: Option<Result<TransitionOutcome, TaskLifecycleError>>,
    pub last_gate: Option<TaskGateResult<TaskStatus>>,
    pub last_batch: Option<BatchResult>,
}

impl ReviewWorld {
    /// Creates a world over an empty store.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryTaskStore::new());
        let lifecycle = TaskLifecycleService::new(Arc::clone(&store), Arc::new(DefaultClock));
        Self {
            gate: TaskGate::new(Arc::clone(&store)),
            batch: BatchCoordinator::new(TaskLifecycleService::new(
                Arc::clone(&store),
                Arc::new(DefaultClock),
            )),
            store,
            lifecycle,
            last_transition: None,
            last_gate: None,
            last_batch: None,
        }
    }
}

impl Default for ReviewWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> ReviewWorld {
    ReviewWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
