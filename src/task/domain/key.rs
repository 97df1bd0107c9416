//! Validated task key.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique, immutable identifier of a governed task.
///
/// Keys double as record names in file-backed stores, so anything that could
/// escape a directory or confuse a file name is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskKey(String);

impl TaskKey {
    /// Maximum key length in characters.
    pub const MAX_LENGTH: usize = 128;

    /// Creates a validated task key.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTaskKey`] when the trimmed value is
    /// empty, too long, contains whitespace, control characters or path
    /// separators, or starts with a dot.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        let is_valid = !normalized.is_empty()
            && normalized.chars().count() <= Self::MAX_LENGTH
            && !normalized.starts_with('.')
            && !normalized
                .chars()
                .any(|ch| ch.is_whitespace() || ch.is_control() || matches!(ch, '/' | '\\'));

        if !is_valid {
            return Err(TaskDomainError::InvalidTaskKey(raw));
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Returns the key as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TaskKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TaskKey {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaskKey> for String {
    fn from(value: TaskKey) -> Self {
        value.0
    }
}
