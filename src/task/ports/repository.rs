//! Repository port for task persistence and status transitions.

use crate::db::ConnectionUnavailable;
use crate::task::domain::{
    DeleteOutcome, Task, TaskDescription, TaskId, TaskListing, TaskStatus, UpdateOutcome,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Each operation is one atomic transaction: either every change it makes
/// becomes visible or none does.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Lists tasks in ascending identifier order, optionally restricted to
    /// one status.
    ///
    /// An empty listing is not an error.
    async fn list(&self, status: Option<TaskStatus>) -> TaskRepositoryResult<TaskListing>;

    /// Stores a new task with status [`TaskStatus::NotStarted`] and returns
    /// the stored row.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when the insert is
    /// rejected.
    async fn add(&self, description: &TaskDescription) -> TaskRepositoryResult<Task>;

    /// Removes a task, returning the description it had.
    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<DeleteOutcome>;

    /// Sets the status and stamps the status-change time.
    async fn set_status(&self, id: TaskId, status: TaskStatus)
    -> TaskRepositoryResult<UpdateOutcome>;

    /// Replaces the description and stamps the status-change time.
    async fn update_description(
        &self,
        id: TaskId,
        description: &TaskDescription,
    ) -> TaskRepositoryResult<UpdateOutcome>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// The database could not be reached.
    #[error(transparent)]
    ConnectionUnavailable(#[from] ConnectionUnavailable),

    /// A statement failed after connecting; the transaction was rolled back.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl From<diesel::result::Error> for TaskRepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        Self::persistence(err)
    }
}
