//! In-memory repository for task lifecycle tests.

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{
        DeleteOutcome, PersistedTaskData, Task, TaskDescription, TaskId, TaskListing, TaskStatus,
        UpdateOutcome,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// Identifiers are handed out from a monotonically increasing counter, so
/// like a database sequence they are never reused after deletion.
#[derive(Debug)]
pub struct InMemoryTaskRepository<C = DefaultClock> {
    state: Arc<RwLock<InMemoryTaskState>>,
    clock: Arc<C>,
}

impl<C> Clone for InMemoryTaskRepository<C> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            clock: Arc::clone(&self.clock),
        }
    }
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: BTreeMap<TaskId, Task>,
    last_id: i32,
}

impl InMemoryTaskRepository<DefaultClock> {
    /// Creates an empty in-memory repository using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(DefaultClock)
    }
}

impl Default for InMemoryTaskRepository<DefaultClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> InMemoryTaskRepository<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an empty in-memory repository using the given clock.
    #[must_use]
    pub fn with_clock(clock: C) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryTaskState::default())),
            clock: Arc::new(clock),
        }
    }

    /// Returns the number of stored tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] if the state lock is
    /// poisoned.
    pub fn len(&self) -> TaskRepositoryResult<usize> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.tasks.len())
    }

    /// Returns `true` when no tasks are stored.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] if the state lock is
    /// poisoned.
    pub fn is_empty(&self) -> TaskRepositoryResult<bool> {
        Ok(self.len()? == 0)
    }

    fn update_with<F>(&self, id: TaskId, apply: F) -> TaskRepositoryResult<UpdateOutcome>
    where
        F: FnOnce(&mut Task, chrono::DateTime<chrono::Utc>),
    {
        let timestamp = self.clock.utc();
        let mut state = self.state.write().map_err(poisoned)?;
        let Some(task) = state.tasks.get_mut(&id) else {
            return Ok(UpdateOutcome::NotFound(id));
        };
        apply(task, timestamp);
        Ok(UpdateOutcome::Updated(id))
    }
}

fn poisoned<T>(err: std::sync::PoisonError<T>) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(format!(
        "in-memory task state lock poisoned: {err}"
    )))
}

#[async_trait]
impl<C> TaskRepository for InMemoryTaskRepository<C>
where
    C: Clock + Send + Sync,
{
    async fn list(&self, status: Option<TaskStatus>) -> TaskRepositoryResult<TaskListing> {
        let state = self.state.read().map_err(poisoned)?;
        let listed = state
            .tasks
            .values()
            .filter(|task| status.is_none_or(|wanted| task.status() == Some(wanted)))
            .cloned()
            .collect();
        Ok(TaskListing::new(listed))
    }

    async fn add(&self, description: &TaskDescription) -> TaskRepositoryResult<Task> {
        let timestamp = self.clock.utc();
        let mut state = self.state.write().map_err(poisoned)?;
        let next_id = state.last_id.checked_add(1).ok_or_else(|| {
            TaskRepositoryError::persistence(std::io::Error::other("task id sequence exhausted"))
        })?;
        state.last_id = next_id;

        let task = Task::from_persisted(PersistedTaskData {
            id: TaskId::new(next_id),
            description: description.clone(),
            status: Some(TaskStatus::NotStarted),
            created_at: timestamp,
            status_changed_at: None,
        });
        state.tasks.insert(task.id(), task.clone());
        Ok(task)
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<DeleteOutcome> {
        let mut state = self.state.write().map_err(poisoned)?;
        Ok(match state.tasks.remove(&id) {
            Some(task) => DeleteOutcome::Deleted {
                task_id: id,
                description: task.description().clone(),
            },
            None => DeleteOutcome::NotFound(id),
        })
    }

    async fn set_status(
        &self,
        id: TaskId,
        status: TaskStatus,
    ) -> TaskRepositoryResult<UpdateOutcome> {
        self.update_with(id, |task, at| task.change_status(status, at))
    }

    async fn update_description(
        &self,
        id: TaskId,
        description: &TaskDescription,
    ) -> TaskRepositoryResult<UpdateOutcome> {
        let replacement = description.clone();
        self.update_with(id, move |task, at| task.edit_description(replacement, at))
    }
}
