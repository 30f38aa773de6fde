//! Text and JSON rendering of command results.

use crate::provision::{DatabaseStatus, ProvisionReport};
use crate::task::domain::{Task, TaskDescription, TaskId, TaskStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Printed when a listing has no rows.
pub const EMPTY_LISTING: &str = "No tasks found matching that criteria.";

const DATE_FORMAT: &str = "%m/%d/%Y";

/// Renders one task as a single text line.
///
/// A task without a stored status is shown as "Not Started"; a task that
/// was never modified shows "Never".
#[must_use]
pub fn task_line(task: &Task) -> String {
    let status = task
        .status()
        .map_or_else(|| TaskStatus::NotStarted.label(), TaskStatus::as_str);
    let modified = task
        .status_changed_at()
        .map_or_else(|| "Never".to_owned(), format_date);
    format!(
        "Task {} | {} | {} | Added: {} | Modified: {}",
        task.id(),
        task.description(),
        status,
        format_date(task.created_at()),
        modified
    )
}

fn format_date(at: DateTime<Utc>) -> String {
    at.format(DATE_FORMAT).to_string()
}

#[derive(Serialize)]
struct TaskRecord<'a> {
    task_id: TaskId,
    description: &'a TaskDescription,
    status: TaskStatus,
    created_at: DateTime<Utc>,
    status_changed_at: Option<DateTime<Utc>>,
}

/// Renders one task as a compact JSON object.
///
/// # Errors
///
/// Returns [`serde_json::Error`] if serialisation fails.
pub fn task_json(task: &Task) -> serde_json::Result<String> {
    serde_json::to_string(&TaskRecord {
        task_id: task.id(),
        description: task.description(),
        status: task.effective_status(),
        created_at: task.created_at(),
        status_changed_at: task.status_changed_at(),
    })
}

/// Confirmation printed after a task is added.
#[must_use]
pub fn added(task: &Task) -> String {
    format!("Added task {}: \"{}\"", task.id(), task.description())
}

/// Confirmation printed after a task is deleted.
#[must_use]
pub fn deleted(task_id: TaskId, description: &TaskDescription) -> String {
    format!("Deleted task {task_id}: \"{description}\"")
}

/// Confirmation printed after a status change.
#[must_use]
pub fn status_set(task_id: TaskId, status: TaskStatus) -> String {
    format!("Task {task_id} status set to {status}")
}

/// Confirmation printed after a description edit.
#[must_use]
pub fn updated(task_id: TaskId, description: &str) -> String {
    format!("Updated task {task_id}: \"{description}\"")
}

/// Message printed when a targeted task does not exist.
#[must_use]
pub fn not_found(task_id: TaskId) -> String {
    format!("No task found with number {task_id}")
}

/// Single-line failure report.
///
/// Line breaks and runs of whitespace inside `cause` are collapsed to single
/// spaces.
#[must_use]
pub fn error_line(attempted: &str, cause: &dyn std::fmt::Display) -> String {
    let flattened = cause
        .to_string()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    format!("Error {attempted}: {flattened}")
}

/// Lines summarising a provisioning run.
#[must_use]
pub fn provision_summary(database: &str, report: &ProvisionReport) -> Vec<String> {
    let created = match report.database {
        DatabaseStatus::Created => format!("Created database '{database}'"),
        DatabaseStatus::AlreadyExists => format!("Database '{database}' already exists"),
    };
    let migrations = if report.migrations_applied.is_empty() {
        "No pending migrations".to_owned()
    } else {
        let versions: Vec<String> = report
            .migrations_applied
            .iter()
            .map(ToString::to_string)
            .collect();
        format!("Applied migrations: {}", versions.join(", "))
    };
    vec![created, "Schema is up to date".to_owned(), migrations]
}
