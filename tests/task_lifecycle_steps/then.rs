//! Then steps for task lifecycle BDD scenarios.

use super::world::{TaskLifecycleWorld, run_async};
use taskdb::task::{
    domain::{DeleteOutcome, TaskDomainError, TaskStatus},
    services::TaskLifecycleError,
};
use rstest_bdd_macros::then;

#[then(r#"the task list contains "{description}" with status "{status}""#)]
fn task_list_contains(
    world: &TaskLifecycleWorld,
    description: String,
    status: String,
) -> Result<(), eyre::Report> {
    let expected_status = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let tasks = world.listed()?;
    let task = tasks
        .iter()
        .find(|task| task.description().as_str() == description)
        .ok_or_else(|| eyre::eyre!("{description:?} not listed in {tasks:?}"))?;

    if task.effective_status() != expected_status {
        return Err(eyre::eyre!(
            "expected status {expected_status}, found {}",
            task.effective_status()
        ));
    }
    Ok(())
}

#[then("the task list is empty")]
fn task_list_is_empty(world: &TaskLifecycleWorld) -> Result<(), eyre::Report> {
    let tasks = world.listed()?;
    if !tasks.is_empty() {
        return Err(eyre::eyre!("expected no tasks, found {tasks:?}"));
    }
    Ok(())
}

#[then(r#"listing tasks with status "{status}" returns only "{description}""#)]
fn filtered_listing(
    world: &TaskLifecycleWorld,
    status: String,
    description: String,
) -> Result<(), eyre::Report> {
    let listed: Vec<String> = run_async(world.service.list_tasks_with_status(&status))?
        .map(|task| task.description().as_str().to_owned())
        .collect();
    if listed != [description.clone()] {
        return Err(eyre::eyre!("expected only {description:?}, got {listed:?}"));
    }
    Ok(())
}

#[then(r#""{description}" has a recorded status change"#)]
fn has_status_change(world: &TaskLifecycleWorld, description: String) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&description)?;
    let tasks = world.listed()?;
    let task = tasks
        .iter()
        .find(|task| task.id() == task_id)
        .ok_or_else(|| eyre::eyre!("task {task_id} not listed"))?;
    if task.status_changed_at().is_none() {
        return Err(eyre::eyre!("task {task_id} has no status change timestamp"));
    }
    Ok(())
}

#[then(r#""{description}" has no recorded status change"#)]
fn has_no_status_change(
    world: &TaskLifecycleWorld,
    description: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&description)?;
    let tasks = world.listed()?;
    let task = tasks
        .iter()
        .find(|task| task.id() == task_id)
        .ok_or_else(|| eyre::eyre!("task {task_id} not listed"))?;
    if let Some(at) = task.status_changed_at() {
        return Err(eyre::eyre!("task {task_id} unexpectedly changed at {at}"));
    }
    Ok(())
}

#[then("the update fails with an invalid status error")]
fn update_fails_with_invalid_status(world: &TaskLifecycleWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_update_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing update result"))?;

    if !matches!(result, Err(TaskLifecycleError::InvalidStatus(_))) {
        return Err(eyre::eyre!("expected InvalidStatus error, got {result:?}"));
    }
    Ok(())
}

#[then("adding fails with an empty description error")]
fn add_fails_with_empty_description(world: &TaskLifecycleWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_add_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing add result"))?;

    if !matches!(
        result,
        Err(TaskLifecycleError::Domain(TaskDomainError::EmptyDescription))
    ) {
        return Err(eyre::eyre!("expected EmptyDescription error, got {result:?}"));
    }
    Ok(())
}

#[then(r#"the deletion removed "{description}""#)]
fn deletion_removed(world: &TaskLifecycleWorld, description: String) -> Result<(), eyre::Report> {
    let result = world
        .last_delete_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing delete result"))?;

    match result {
        Ok(DeleteOutcome::Deleted {
            description: removed,
            ..
        }) if removed.as_str() == description => Ok(()),
        other => Err(eyre::eyre!("expected {description:?} to be deleted, got {other:?}")),
    }
}

#[then("the deletion found no task")]
fn deletion_found_nothing(world: &TaskLifecycleWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_delete_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing delete result"))?;

    if !matches!(result, Ok(DeleteOutcome::NotFound(_))) {
        return Err(eyre::eyre!("expected NotFound, got {result:?}"));
    }
    Ok(())
}
