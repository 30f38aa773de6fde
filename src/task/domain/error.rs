//! Error types for task domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task identifier is not a well-formed integer.
    #[error("task ID must be a number, got '{0}'")]
    InvalidTaskId(String),

    /// The task description is empty after trimming.
    #[error("task description must not be empty")]
    EmptyDescription,
}

/// Error returned while parsing task statuses from input or persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status '{0}', expected NOT_STARTED, STARTED, or COMPLETED")]
pub struct ParseTaskStatusError(pub String);
