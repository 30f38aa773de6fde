//! When steps for task lifecycle BDD scenarios.

use super::world::{TaskLifecycleWorld, run_async};
use rstest_bdd_macros::when;

#[when(r#"a task "{description}" is added"#)]
fn add_task(world: &mut TaskLifecycleWorld, description: String) {
    let result = run_async(world.service.add_task(description.clone()));
    if let Ok(ref task) = result {
        world.ids.insert(description, task.id());
    }
    world.last_add_result = Some(result);
}

#[when("a task with a blank description is added")]
fn add_blank_task(world: &mut TaskLifecycleWorld) {
    world.last_add_result = Some(run_async(world.service.add_task("   ")));
}

#[when(r#"the status of "{description}" is set to "{status}""#)]
fn set_status(
    world: &mut TaskLifecycleWorld,
    description: String,
    status: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&description)?;
    let result = run_async(world.service.set_status(task_id, &status));
    world.last_update_result = Some(result.map(|change| change.outcome));
    Ok(())
}

#[when(r#"the description of "{description}" is changed to "{replacement}""#)]
fn change_description(
    world: &mut TaskLifecycleWorld,
    description: String,
    replacement: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&description)?;
    let result = run_async(
        world
            .service
            .update_description(task_id, replacement.clone()),
    );
    if matches!(result, Ok(ref outcome) if outcome.is_updated()) {
        world.ids.remove(&description);
        world.ids.insert(replacement, task_id);
    }
    world.last_update_result = Some(result);
    Ok(())
}

#[when(r#""{description}" is deleted"#)]
fn delete_task(world: &mut TaskLifecycleWorld, description: String) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&description)?;
    world.last_delete_result = Some(run_async(world.service.delete_task(task_id)));
    Ok(())
}
