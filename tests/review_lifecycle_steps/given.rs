//! Given steps for review lifecycle BDD scenarios.

use super::world::{ReviewWorld, run_async};
use devflow::task::{domain::TaskKey, ports::TaskStore, services::TransitionTaskRequest};
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#"task "{task_key}" has never been reviewed"#)]
fn task_never_reviewed(world: &mut ReviewWorld, task_key: String) -> Result<(), eyre::Report> {
    let entry = run_async(world.store.load(&TaskKey::new(task_key)?))?;
    eyre::ensure!(!entry.is_present(), "task should not have a record yet");
    Ok(())
}

#[given(r#"task "{task_key}" has already passed through "{path}""#)]
fn task_passed_through(
    world: &mut ReviewWorld,
    task_key: String,
    path: String,
) -> Result<(), eyre::Report> {
    for status in path.split(',').map(str::trim) {
        let request = TransitionTaskRequest::new(task_key.as_str(), status, "setup")
            .with_notes("scenario setup");
        run_async(world.lifecycle.transition(request))
            .wrap_err_with(|| format!("move {task_key} to {status} in scenario setup"))?;
    }
    Ok(())
}
