//! Identifier and validated scalar types for the task domain.

use super::TaskDomainError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Database-assigned identifier of a task.
///
/// Identifiers come from a `SERIAL` sequence, so a deleted task's identifier
/// is never handed out again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskId(i32);

impl TaskId {
    /// Wraps a raw identifier read from storage.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl FromStr for TaskId {
    type Err = TaskDomainError;

    /// Parses a caller-supplied identifier.
    ///
    /// Surrounding whitespace is ignored. Values that are not integers, or do
    /// not fit the storage column, are rejected.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value
            .trim()
            .parse::<i32>()
            .map(Self)
            .map_err(|_| TaskDomainError::InvalidTaskId(value.to_owned()))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-empty task description.
///
/// The text is kept exactly as supplied; only the emptiness check trims.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskDescription(String);

impl TaskDescription {
    /// Creates a validated description.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyDescription`] when the value is empty
    /// or contains only whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(TaskDomainError::EmptyDescription);
        }
        Ok(Self(raw))
    }

    /// Returns the description as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TaskDescription {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
