//! Diesel row models for task persistence.

use super::schema::tasks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub task_id: i32,
    /// Task description.
    pub description: String,
    /// Lifecycle status; null for rows written before statuses existed.
    pub status: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest status change or description edit.
    pub status_changed_at: Option<DateTime<Utc>>,
}
