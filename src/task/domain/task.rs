//! Task entity and its persisted representation.

use super::{TaskDescription, TaskId, TaskStatus};
use chrono::{DateTime, Utc};

/// A single to-do item with its audit timestamps.
///
/// Tasks are only ever materialised from storage: the database assigns the
/// identifier and both timestamps come from the server clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    description: TaskDescription,
    status: Option<TaskStatus>,
    created_at: DateTime<Utc>,
    status_changed_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted description.
    pub description: TaskDescription,
    /// Persisted status; `None` for rows written before statuses existed.
    pub status: Option<TaskStatus>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the latest status change or description edit.
    pub status_changed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            description: data.description,
            status: data.status,
            created_at: data.created_at,
            status_changed_at: data.status_changed_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task description.
    #[must_use]
    pub const fn description(&self) -> &TaskDescription {
        &self.description
    }

    /// Returns the stored status, if any.
    #[must_use]
    pub const fn status(&self) -> Option<TaskStatus> {
        self.status
    }

    /// Returns the status used for display, treating a missing status as
    /// [`TaskStatus::NotStarted`].
    #[must_use]
    pub fn effective_status(&self) -> TaskStatus {
        self.status.unwrap_or_default()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the timestamp of the latest status change or description edit.
    ///
    /// `None` means the task has not been touched since creation.
    #[must_use]
    pub const fn status_changed_at(&self) -> Option<DateTime<Utc>> {
        self.status_changed_at
    }

    /// Applies a status change at the given instant.
    pub fn change_status(&mut self, status: TaskStatus, at: DateTime<Utc>) {
        self.status = Some(status);
        self.status_changed_at = Some(at);
    }

    /// Replaces the description at the given instant.
    ///
    /// Edits share the status-change timestamp slot.
    pub fn edit_description(&mut self, description: TaskDescription, at: DateTime<Utc>) {
        self.description = description;
        self.status_changed_at = Some(at);
    }
}
