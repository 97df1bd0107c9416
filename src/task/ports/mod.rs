//! Port contracts for review lifecycle governance.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod repository;

pub use repository::{ScanEntry, TaskStore, TaskStoreError, TaskStoreResult};
