//! Service layer for task creation, listing, and status transitions.

use crate::task::{
    domain::{
        DeleteOutcome, ParseTaskStatusError, Task, TaskDescription, TaskDomainError, TaskId,
        TaskListing, TaskStatus, UpdateOutcome,
    },
    ports::{TaskRepository, TaskRepositoryError},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// The requested status is not one of the enumerated values.
    #[error(transparent)]
    InvalidStatus(#[from] ParseTaskStatusError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
}

impl TaskLifecycleError {
    /// Returns `true` when caller input was rejected before any database call.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Domain(_) | Self::InvalidStatus(_))
    }

    /// Returns `true` when the database could not be reached.
    #[must_use]
    pub const fn is_connection_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Repository(TaskRepositoryError::ConnectionUnavailable(_))
        )
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Outcome of a status update together with the status that was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    /// Whether the task existed.
    pub outcome: UpdateOutcome,
    /// Normalised status sent to the repository.
    pub status: TaskStatus,
}

/// Task lifecycle orchestration service.
#[derive(Clone)]
pub struct TaskLifecycleService<R>
where
    R: TaskRepository,
{
    repository: Arc<R>,
}

impl<R> TaskLifecycleService<R>
where
    R: TaskRepository,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Lists tasks, optionally restricted to one status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the read fails.
    pub async fn list_tasks(&self, status: Option<TaskStatus>) -> TaskLifecycleResult<TaskListing> {
        self.repository.list(status).await.map_err(|err| {
            error!(operation = "list", status = ?status, error = %err, "listing tasks failed");
            err.into()
        })
    }

    /// Lists tasks whose status matches a caller-supplied status string.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::InvalidStatus`] before touching the
    /// repository when the status is unknown, or
    /// [`TaskLifecycleError::Repository`] when the read fails.
    pub async fn list_tasks_with_status(&self, status: &str) -> TaskLifecycleResult<TaskListing> {
        let parsed = TaskStatus::try_from(status)?;
        self.list_tasks(Some(parsed)).await
    }

    /// Adds a task with the given description.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for an empty description, or
    /// [`TaskLifecycleError::Repository`] when the insert fails.
    pub async fn add_task(&self, description: impl Into<String>) -> TaskLifecycleResult<Task> {
        let validated = TaskDescription::new(description)?;
        let task = self.repository.add(&validated).await.map_err(|err| {
            error!(operation = "add", error = %err, "adding task failed");
            TaskLifecycleError::from(err)
        })?;
        info!(operation = "add", task_id = %task.id(), "task added");
        Ok(task)
    }

    /// Deletes a task, returning its description when it existed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the delete fails. A
    /// missing task is reported as [`DeleteOutcome::NotFound`].
    pub async fn delete_task(&self, task_id: TaskId) -> TaskLifecycleResult<DeleteOutcome> {
        let outcome = self.repository.delete(task_id).await.map_err(|err| {
            error!(operation = "delete", task_id = %task_id, error = %err, "deleting task failed");
            TaskLifecycleError::from(err)
        })?;
        info!(
            operation = "delete",
            task_id = %task_id,
            deleted = outcome.is_deleted(),
            "delete finished"
        );
        Ok(outcome)
    }

    /// Sets the status of a task from a caller-supplied status string.
    ///
    /// The status is normalised to its uppercase form before validation.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::InvalidStatus`] before touching the
    /// repository when the status is unknown, or
    /// [`TaskLifecycleError::Repository`] when the update fails.
    pub async fn set_status(
        &self,
        task_id: TaskId,
        status: &str,
    ) -> TaskLifecycleResult<StatusChange> {
        let parsed = TaskStatus::try_from(status)?;
        let outcome = self
            .repository
            .set_status(task_id, parsed)
            .await
            .map_err(|err| {
                error!(
                    operation = "set_status",
                    task_id = %task_id,
                    status = %parsed,
                    error = %err,
                    "setting task status failed"
                );
                TaskLifecycleError::from(err)
            })?;
        info!(
            operation = "set_status",
            task_id = %task_id,
            status = %parsed,
            updated = outcome.is_updated(),
            "status update finished"
        );
        Ok(StatusChange {
            outcome,
            status: parsed,
        })
    }

    /// Replaces the description of a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for an empty description, or
    /// [`TaskLifecycleError::Repository`] when the update fails.
    pub async fn update_description(
        &self,
        task_id: TaskId,
        description: impl Into<String>,
    ) -> TaskLifecycleResult<UpdateOutcome> {
        let validated = TaskDescription::new(description)?;
        let outcome = self
            .repository
            .update_description(task_id, &validated)
            .await
            .map_err(|err| {
                error!(
                    operation = "update_description",
                    task_id = %task_id,
                    error = %err,
                    "updating task description failed"
                );
                TaskLifecycleError::from(err)
            })?;
        info!(
            operation = "update_description",
            task_id = %task_id,
            updated = outcome.is_updated(),
            "description update finished"
        );
        Ok(outcome)
    }
}
