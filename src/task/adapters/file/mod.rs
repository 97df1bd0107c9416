//! File-backed adapter storing each task as a markdown document.

pub mod document;
mod store;

pub use document::DocumentError;
pub use store::FileTaskStore;
