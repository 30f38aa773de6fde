//! Given steps for task lifecycle BDD scenarios.

use super::world::{TaskLifecycleWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given("an empty task list")]
fn empty_task_list(world: &mut TaskLifecycleWorld) -> Result<(), eyre::Report> {
    if !world.listed()?.is_empty() {
        return Err(eyre::eyre!("expected a fresh store"));
    }
    Ok(())
}

#[given(r#"a task "{description}" has been added"#)]
fn task_has_been_added(
    world: &mut TaskLifecycleWorld,
    description: String,
) -> Result<(), eyre::Report> {
    let task = run_async(world.service.add_task(description.clone()))
        .wrap_err("add task in scenario setup")?;
    world.ids.insert(description, task.id());
    Ok(())
}
