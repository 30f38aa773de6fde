//! Outcome values for task store operations.
//!
//! A targeted row that does not exist is an ordinary business outcome, so it
//! is modelled as a variant here rather than as an error.

use super::{Task, TaskDescription, TaskId};

/// Result of deleting a task by identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The task existed and has been removed.
    Deleted {
        /// Identifier of the removed task.
        task_id: TaskId,
        /// Description the task had when it was removed.
        description: TaskDescription,
    },
    /// No task with the identifier exists.
    NotFound(TaskId),
}

impl DeleteOutcome {
    /// Returns `true` when a row was removed.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted { .. })
    }
}

/// Result of updating a task by identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The task existed and has been updated.
    Updated(TaskId),
    /// No task with the identifier exists.
    NotFound(TaskId),
}

impl UpdateOutcome {
    /// Returns `true` when a row was updated.
    #[must_use]
    pub const fn is_updated(self) -> bool {
        matches!(self, Self::Updated(_))
    }
}

/// Finite, consume-once sequence of tasks ordered by ascending identifier.
///
/// The listing is materialised inside the read transaction, so the
/// connection is already released when callers iterate it.
#[derive(Debug)]
pub struct TaskListing {
    tasks: std::vec::IntoIter<Task>,
}

impl TaskListing {
    /// Wraps tasks that are already in ascending identifier order.
    #[must_use]
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks: tasks.into_iter(),
        }
    }

    /// Returns `true` when no tasks remain to be yielded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.as_slice().is_empty()
    }
}

impl Iterator for TaskListing {
    type Item = Task;

    fn next(&mut self) -> Option<Self::Item> {
        self.tasks.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.tasks.size_hint()
    }
}

impl ExactSizeIterator for TaskListing {}
