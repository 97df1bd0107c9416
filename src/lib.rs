//! Devflow: review lifecycle governance for documentation-and-release
//! workflows.
//!
//! A piece of engineering work moves through a fixed review lifecycle, and
//! downstream actions (test-case generation, database verification,
//! integration documentation, ticket publication) are only permitted once
//! the work has cleared review.
//!
//! # Architecture
//!
//! Devflow follows hexagonal architecture principles:
//!
//! - **Domain**: Pure lifecycle rules with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence
//! - **Adapters**: Concrete store implementations (in-memory, markdown files)
//!
//! # Modules
//!
//! - [`task`]: Status transitions, gates, audit trail, batches, and reports
//! - [`config`]: Project root and store location settings
//! - [`telemetry`]: Tracing subscriber installation

pub mod config;
pub mod task;
pub mod telemetry;
