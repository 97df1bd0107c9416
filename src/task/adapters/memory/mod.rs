//! In-memory adapters for the task store port.

mod task;

pub use task::InMemoryTaskStore;
