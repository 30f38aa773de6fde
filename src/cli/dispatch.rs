//! Maps parsed commands onto service calls, output lines, and exit statuses.

use super::render;
use super::{Command, ListFormat, ProvisionArgs, TaskCommand};
use crate::config::AppConfig;
use crate::db::ConnectionGateway;
use crate::provision::{SchemaProvisioner, SchemaSource};
use crate::task::adapters::postgres::PostgresTaskRepository;
use crate::task::domain::{DeleteOutcome, TaskId, TaskListing, TaskStatus, UpdateOutcome};
use crate::task::ports::TaskRepository;
use crate::task::services::{StatusChange, TaskLifecycleError, TaskLifecycleService};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::error;

/// Process exit status of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Normal completion, including "not found" outcomes and statement
    /// failures that were reported and rolled back.
    Success,
    /// The database was unreachable, provisioning failed, or configuration
    /// was unusable.
    Failure,
    /// Caller input failed validation.
    Usage,
}

impl ExitStatus {
    /// Numeric process exit code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::Usage => 2,
        }
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        Self::from(status.code())
    }
}

/// Runs `command` against the database described by `config`.
///
/// # Errors
///
/// Returns an I/O error if writing to `out` or `err` fails.
pub async fn execute<O, E>(
    command: Command,
    config: &AppConfig,
    out: &mut O,
    err: &mut E,
) -> io::Result<ExitStatus>
where
    O: Write + ?Sized,
    E: Write + ?Sized,
{
    let target = ConnectionGateway::new(config.task_db.clone(), config.timeouts);
    match command {
        Command::Task(task_command) => {
            let repository = Arc::new(PostgresTaskRepository::new(target));
            let service = TaskLifecycleService::new(repository);
            run_task_command(&service, task_command, out, err).await
        }
        Command::Provision(ProvisionArgs { schema }) => {
            let admin = match config.admin_credentials() {
                Ok(credentials) => ConnectionGateway::new(credentials.clone(), config.timeouts),
                Err(config_err) => {
                    writeln!(
                        err,
                        "{}",
                        render::error_line("reading configuration", &config_err)
                    )?;
                    return Ok(ExitStatus::Failure);
                }
            };
            let source = SchemaSource::File(schema.unwrap_or_else(|| config.schema_path.clone()));
            run_provision(SchemaProvisioner::new(admin, target), source, out, err).await
        }
    }
}

/// Runs a task store command through `service`.
///
/// # Errors
///
/// Returns an I/O error if writing to `out` or `err` fails.
pub async fn run_task_command<R, O, E>(
    service: &TaskLifecycleService<R>,
    command: TaskCommand,
    out: &mut O,
    err: &mut E,
) -> io::Result<ExitStatus>
where
    R: TaskRepository,
    O: Write + ?Sized,
    E: Write + ?Sized,
{
    match command {
        TaskCommand::List { status, format } => {
            let listing = match status {
                Some(raw) => service.list_tasks_with_status(&raw).await,
                None => service.list_tasks(None).await,
            };
            finish_listing(listing, format, out, err)
        }
        TaskCommand::Started(format) => {
            let listing = service.list_tasks(Some(TaskStatus::Started)).await;
            finish_listing(listing, format, out, err)
        }
        TaskCommand::Completed(format) => {
            let listing = service.list_tasks(Some(TaskStatus::Completed)).await;
            finish_listing(listing, format, out, err)
        }
        TaskCommand::NotStarted(format) => {
            let listing = service.list_tasks(Some(TaskStatus::NotStarted)).await;
            finish_listing(listing, format, out, err)
        }
        TaskCommand::Add { description } => match service.add_task(description).await {
            Ok(task) => {
                writeln!(out, "{}", render::added(&task))?;
                Ok(ExitStatus::Success)
            }
            Err(failure) => report(err, "adding task", &failure),
        },
        TaskCommand::Delete { task_id } => {
            let id = match parse_task_id(&task_id, err)? {
                Ok(id) => id,
                Err(status) => return Ok(status),
            };
            match service.delete_task(id).await {
                Ok(DeleteOutcome::Deleted {
                    task_id: deleted_id,
                    description,
                }) => writeln!(out, "{}", render::deleted(deleted_id, &description))?,
                Ok(DeleteOutcome::NotFound(missing)) => {
                    writeln!(out, "{}", render::not_found(missing))?;
                }
                Err(failure) => return report(err, &format!("deleting task {id}"), &failure),
            }
            Ok(ExitStatus::Success)
        }
        TaskCommand::Status { task_id, status } => {
            let id = match parse_task_id(&task_id, err)? {
                Ok(id) => id,
                Err(exit) => return Ok(exit),
            };
            match service.set_status(id, &status).await {
                Ok(StatusChange { outcome, status: applied }) => {
                    let line = match outcome {
                        UpdateOutcome::Updated(updated) => render::status_set(updated, applied),
                        UpdateOutcome::NotFound(missing) => render::not_found(missing),
                    };
                    writeln!(out, "{line}")?;
                    Ok(ExitStatus::Success)
                }
                Err(failure) => report(err, &format!("setting status of task {id}"), &failure),
            }
        }
        TaskCommand::Update {
            task_id,
            description,
        } => {
            let id = match parse_task_id(&task_id, err)? {
                Ok(id) => id,
                Err(exit) => return Ok(exit),
            };
            match service.update_description(id, description.as_str()).await {
                Ok(UpdateOutcome::Updated(updated)) => {
                    writeln!(out, "{}", render::updated(updated, &description))?;
                    Ok(ExitStatus::Success)
                }
                Ok(UpdateOutcome::NotFound(missing)) => {
                    writeln!(out, "{}", render::not_found(missing))?;
                    Ok(ExitStatus::Success)
                }
                Err(failure) => report(err, &format!("updating task {id}"), &failure),
            }
        }
    }
}

/// Provisions the database on a blocking worker thread.
///
/// # Errors
///
/// Returns an I/O error if writing to `out` or `err` fails.
pub async fn run_provision<O, E>(
    provisioner: SchemaProvisioner,
    source: SchemaSource,
    out: &mut O,
    err: &mut E,
) -> io::Result<ExitStatus>
where
    O: Write + ?Sized,
    E: Write + ?Sized,
{
    let database = provisioner.target().database().to_owned();
    let attempted = format!("provisioning database '{database}'");
    let outcome = tokio::task::spawn_blocking(move || provisioner.provision(&source)).await;
    match outcome {
        Ok(Ok(report)) => {
            for line in render::provision_summary(&database, &report) {
                writeln!(out, "{line}")?;
            }
            Ok(ExitStatus::Success)
        }
        Ok(Err(failure)) => {
            error!(database = %database, error = %failure, "provisioning failed");
            writeln!(err, "{}", render::error_line(&attempted, &failure))?;
            Ok(ExitStatus::Failure)
        }
        Err(join_err) => {
            writeln!(err, "{}", render::error_line(&attempted, &join_err))?;
            Ok(ExitStatus::Failure)
        }
    }
}

fn parse_task_id<E>(raw: &str, err: &mut E) -> io::Result<Result<TaskId, ExitStatus>>
where
    E: Write + ?Sized,
{
    match raw.parse::<TaskId>() {
        Ok(id) => Ok(Ok(id)),
        Err(invalid) => {
            writeln!(err, "{}", render::error_line("reading task ID", &invalid))?;
            Ok(Err(ExitStatus::Usage))
        }
    }
}

fn finish_listing<O, E>(
    listing: Result<TaskListing, TaskLifecycleError>,
    format: ListFormat,
    out: &mut O,
    err: &mut E,
) -> io::Result<ExitStatus>
where
    O: Write + ?Sized,
    E: Write + ?Sized,
{
    let tasks = match listing {
        Ok(tasks) => tasks,
        Err(failure) => return report(err, "listing tasks", &failure),
    };
    if tasks.is_empty() && !format.json {
        writeln!(out, "{}", render::EMPTY_LISTING)?;
        return Ok(ExitStatus::Success);
    }
    for task in tasks {
        if format.json {
            let line = render::task_json(&task).map_err(io::Error::other)?;
            writeln!(out, "{line}")?;
        } else {
            writeln!(out, "{}", render::task_line(&task))?;
        }
    }
    Ok(ExitStatus::Success)
}

fn report<E>(err: &mut E, attempted: &str, failure: &TaskLifecycleError) -> io::Result<ExitStatus>
where
    E: Write + ?Sized,
{
    writeln!(err, "{}", render::error_line(attempted, failure))?;
    Ok(exit_status_for(failure))
}

const fn exit_status_for(failure: &TaskLifecycleError) -> ExitStatus {
    if failure.is_validation() {
        ExitStatus::Usage
    } else if failure.is_connection_unavailable() {
        ExitStatus::Failure
    } else {
        ExitStatus::Success
    }
}
