//! Review lifecycle governance for engineering tasks.
//!
//! A task moves through a fixed review lifecycle
//! (`DRAFT -> PENDING_REVIEW -> APPROVED -> PUBLISHED`, with
//! `CHANGES_REQUESTED` as the rejection loop). Downstream generators consult
//! a gate before doing any work, every status change is appended to an
//! audit trail, and batch and report operations are layered on top. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
