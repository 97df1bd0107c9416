//! Store adapters for task records.
//!
//! - [`memory::InMemoryTaskStore`]: thread-safe in-memory storage for tests
//! - [`file::FileTaskStore`]: one markdown document with a YAML front-matter
//!   block per task, under the project's documentation directory

pub mod file;
pub mod memory;
