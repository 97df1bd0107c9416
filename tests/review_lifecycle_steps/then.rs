//! Then steps for review lifecycle BDD scenarios.

use super::world::{ReviewWorld, run_async};
use devflow::task::{
    domain::{TaskKey, TaskStatus},
    ports::TaskStore,
    services::FailureKind,
};
use rstest_bdd_macros::then;

#[then("the transition succeeds")]
fn transition_succeeds(world: &ReviewWorld) -> Result<(), eyre::Report> {
    match world.last_transition.as_ref() {
        Some(Ok(_)) => Ok(()),
        Some(Err(err)) => Err(eyre::eyre!("expected success, got {err}")),
        None => Err(eyre::eyre!("missing transition result")),
    }
}

#[then("the transition fails because a justification is required")]
fn transition_needs_justification(world: &ReviewWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_transition
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing transition result"))?;
    let Err(err) = result else {
        return Err(eyre::eyre!("expected a justification failure, got success"));
    };
    eyre::ensure!(
        err.kind() == FailureKind::JustificationRequired,
        "expected JustificationRequired, got {err:?}"
    );
    Ok(())
}

#[then(r#"task "{task_key}" has status "{status}""#)]
fn task_has_status(
    world: &ReviewWorld,
    task_key: String,
    status: String,
) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())?;
    let actual = run_async(world.store.load(&TaskKey::new(task_key)?))?.status();
    eyre::ensure!(actual == expected, "expected status {expected}, found {actual}");
    Ok(())
}

#[then(r#"the history of task "{task_key}" holds {count:usize} entries"#)]
fn history_holds(world: &ReviewWorld, task_key: String, count: usize) -> Result<(), eyre::Report> {
    let record = run_async(world.store.load(&TaskKey::new(task_key)?))?.into_record();
    eyre::ensure!(
        record.reviews.len() == count,
        "expected {count} history entries, found {}",
        record.reviews.len()
    );
    eyre::ensure!(record.stats_consistent(), "stats drifted from history");
    Ok(())
}

#[then(r#"the gate refuses because the task is "{current}" and "{required}" is required"#)]
fn gate_refuses(
    world: &ReviewWorld,
    current: String,
    required: String,
) -> Result<(), eyre::Report> {
    let result = world
        .last_gate
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing gate result"))?;
    let Err(err) = result else {
        return Err(eyre::eyre!("expected the gate to refuse"));
    };
    let gate_error = err
        .gate_error()
        .ok_or_else(|| eyre::eyre!("expected a gate error, got {err:?}"))?;
    eyre::ensure!(
        gate_error.current == TaskStatus::try_from(current.as_str())?
            && gate_error.required == TaskStatus::try_from(required.as_str())?,
        "unexpected gate error {gate_error:?}"
    );
    Ok(())
}

#[then("the batch stops before attempting every item")]
fn batch_stops_early(world: &ReviewWorld) -> Result<(), eyre::Report> {
    let batch = world
        .last_batch
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing batch result"))?;
    eyre::ensure!(
        batch.attempted() < batch.summary.total,
        "batch attempted {} of {} items",
        batch.attempted(),
        batch.summary.total
    );
    eyre::ensure!(batch.halted_at.is_some(), "batch should record where it halted");
    Ok(())
}

#[then("the batch records {count:usize} failures")]
fn batch_records_failures(world: &ReviewWorld, count: usize) -> Result<(), eyre::Report> {
    let batch = world
        .last_batch
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing batch result"))?;
    eyre::ensure!(
        batch.failed.len() == count,
        "expected {count} failures, found {}",
        batch.failed.len()
    );
    Ok(())
}
