//! Application services for review lifecycle governance.

mod batch;
mod checklist;
mod gate;
mod lifecycle;
mod report;

pub use batch::{BatchCoordinator, BatchFailure, BatchResult, BatchSuccess, BatchSummary};
pub use checklist::{ChecklistCheck, ChecklistFailure, ChecklistOutcome, ChecklistService};
pub use gate::{DownstreamAction, TaskGate, TaskGateError, TaskGateResult};
pub use lifecycle::{
    FailureKind, QueryOptions, TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService,
    TaskStatusView, TransitionOutcome, TransitionTaskRequest,
};
pub use report::{
    ActivityEntry, BlockedTask, DEFAULT_ACTIVITY_LIMIT, ReportAggregator, ReportFilter,
    ReportSummary, StatusReport,
};
