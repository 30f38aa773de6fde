//! `PostgreSQL` repository implementation for task lifecycle storage.

use super::{models::TaskRow, schema::tasks};
use crate::db::ConnectionGateway;
use crate::task::{
    domain::{
        DeleteOutcome, PersistedTaskData, Task, TaskDescription, TaskId, TaskListing, TaskStatus,
        UpdateOutcome,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::dsl::now;
use diesel::pg::PgConnection;
use diesel::prelude::*;

/// `PostgreSQL`-backed task repository.
///
/// Each call opens its own connection through the gateway, runs a single
/// transaction, and drops the connection before returning.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    gateway: ConnectionGateway,
}

impl PostgresTaskRepository {
    /// Creates a new repository that connects through `gateway`.
    #[must_use]
    pub const fn new(gateway: ConnectionGateway) -> Self {
        Self { gateway }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let gateway = self.gateway.clone();
        tokio::task::spawn_blocking(move || gateway.transaction(f))
            .await
            .map_err(TaskRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn list(&self, status: Option<TaskStatus>) -> TaskRepositoryResult<TaskListing> {
        self.run_blocking(move |connection| {
            let mut query = tasks::table
                .select(TaskRow::as_select())
                .order(tasks::task_id.asc())
                .into_boxed();
            if let Some(wanted) = status {
                query = query.filter(tasks::status.eq(wanted.as_str()));
            }
            let rows = query.load::<TaskRow>(connection)?;
            let listed = rows
                .into_iter()
                .map(row_to_task)
                .collect::<TaskRepositoryResult<Vec<_>>>()?;
            Ok(TaskListing::new(listed))
        })
        .await
    }

    async fn add(&self, description: &TaskDescription) -> TaskRepositoryResult<Task> {
        let text = description.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = diesel::insert_into(tasks::table)
                .values((
                    tasks::description.eq(&text),
                    tasks::status.eq(TaskStatus::NotStarted.as_str()),
                    tasks::created_at.eq(now),
                ))
                .returning(TaskRow::as_returning())
                .get_result::<TaskRow>(connection)?;
            row_to_task(row)
        })
        .await
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<DeleteOutcome> {
        self.run_blocking(move |connection| {
            let removed = diesel::delete(tasks::table.find(id.value()))
                .returning(tasks::description)
                .get_result::<String>(connection)
                .optional()?;
            match removed {
                Some(text) => Ok(DeleteOutcome::Deleted {
                    task_id: id,
                    description: TaskDescription::new(text)
                        .map_err(TaskRepositoryError::persistence)?,
                }),
                None => Ok(DeleteOutcome::NotFound(id)),
            }
        })
        .await
    }

    async fn set_status(
        &self,
        id: TaskId,
        status: TaskStatus,
    ) -> TaskRepositoryResult<UpdateOutcome> {
        self.run_blocking(move |connection| {
            let updated_count = diesel::update(tasks::table.find(id.value()))
                .set((
                    tasks::status.eq(status.as_str()),
                    tasks::status_changed_at.eq(now),
                ))
                .execute(connection)?;
            Ok(update_outcome(id, updated_count))
        })
        .await
    }

    async fn update_description(
        &self,
        id: TaskId,
        description: &TaskDescription,
    ) -> TaskRepositoryResult<UpdateOutcome> {
        let text = description.as_str().to_owned();
        self.run_blocking(move |connection| {
            let updated_count = diesel::update(tasks::table.find(id.value()))
                .set((
                    tasks::description.eq(&text),
                    tasks::status_changed_at.eq(now),
                ))
                .execute(connection)?;
            Ok(update_outcome(id, updated_count))
        })
        .await
    }
}

const fn update_outcome(id: TaskId, updated_count: usize) -> UpdateOutcome {
    if updated_count == 0 {
        UpdateOutcome::NotFound(id)
    } else {
        UpdateOutcome::Updated(id)
    }
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        task_id,
        description: persisted_description,
        status: persisted_status,
        created_at,
        status_changed_at,
    } = row;

    let description =
        TaskDescription::new(persisted_description).map_err(TaskRepositoryError::persistence)?;
    let status = persisted_status
        .as_deref()
        .map(TaskStatus::try_from)
        .transpose()
        .map_err(TaskRepositoryError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::new(task_id),
        description,
        status,
        created_at,
        status_changed_at,
    }))
}
