//! Shared world state for task lifecycle BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use taskdb::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{DeleteOutcome, Task, TaskId, UpdateOutcome},
    services::{TaskLifecycleError, TaskLifecycleService},
};
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestTaskService = TaskLifecycleService<InMemoryTaskRepository>;

/// Scenario world for task lifecycle behaviour tests.
pub struct TaskLifecycleWorld {
    pub service: TestTaskService,
    pub ids: HashMap<String, TaskId>,
    pub last_add_result: Option<Result<Task, TaskLifecycleError>>,
    pub last_update_result: Option<Result<UpdateOutcome, TaskLifecycleError>>,
    pub last_delete_result: Option<Result<DeleteOutcome, TaskLifecycleError>>,
}

impl TaskLifecycleWorld {
    /// Creates a world backed by an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            service: TaskLifecycleService::new(Arc::new(InMemoryTaskRepository::new())),
            ids: HashMap::new(),
            last_add_result: None,
            last_update_result: None,
            last_delete_result: None,
        }
    }

    /// Identifier recorded for a task added under `description`.
    pub fn task_id(&self, description: &str) -> Result<TaskId, eyre::Report> {
        self.ids
            .get(description)
            .copied()
            .ok_or_else(|| eyre::eyre!("no task named {description:?} in scenario world"))
    }

    /// Current contents of the store in listing order.
    pub fn listed(&self) -> Result<Vec<Task>, eyre::Report> {
        let listing = run_async(self.service.list_tasks(None))?;
        Ok(listing.collect())
    }
}

impl Default for TaskLifecycleWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskLifecycleWorld {
    TaskLifecycleWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
