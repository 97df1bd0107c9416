//! Domain model for review lifecycle governance.
//!
//! The domain holds the status graph, the gating rank, the persisted task
//! record, and the append-only audit trail. It performs no I/O; stores and
//! clocks are supplied by the layers above.

mod audit;
mod error;
mod key;
mod record;
mod status;
mod timestamp;
mod validator;

pub use audit::{AuditEntry, append};
pub use error::{GateError, ParseTaskStatusError, TaskDomainError};
pub use key::TaskKey;
pub use record::{StatusStats, TaskEntry, TaskRecord, TransitionRecord};
pub use status::TaskStatus;
pub use validator::{TransitionValidator, validate_transition};
