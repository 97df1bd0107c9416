//! When steps for review lifecycle BDD scenarios.

use super::world::{ReviewWorld, run_async};
use devflow::task::{domain::TaskStatus, services::TransitionTaskRequest};
use rstest_bdd_macros::when;

#[when(r#""{actor}" requests "{status}" for task "{task_key}""#)]
fn request_transition(world: &mut ReviewWorld, actor: String, status: String, task_key: String) {
    let request = TransitionTaskRequest::new(task_key, status, actor);
    world.last_transition = Some(run_async(world.lifecycle.transition(request)));
}

#[when(
    r#""{actor}" submits a justified request for "{status}" on task "{task_key}" because "{notes}""#
)]
fn request_justified_transition(
    world: &mut ReviewWorld,
    actor: String,
    status: String,
    task_key: String,
    notes: String,
) {
    let request = TransitionTaskRequest::new(task_key, status, actor).with_notes(notes);
    world.last_transition = Some(run_async(world.lifecycle.transition(request)));
}

#[when(r#"the gate requires "{status}" for task "{task_key}""#)]
fn gate_requires(
    world: &mut ReviewWorld,
    status: String,
    task_key: String,
) -> Result<(), eyre::Report> {
    let minimum = TaskStatus::try_from(status.as_str())?;
    world.last_gate = Some(run_async(world.gate.require_minimum(&task_key, minimum)));
    Ok(())
}

#[when(r#"a halting batch publishes "{first}" and approves "{second}""#)]
fn halting_batch(world: &mut ReviewWorld, first: String, second: String) {
    let operations = vec![
        TransitionTaskRequest::new(first, "PUBLISHED", "carol").with_notes("release"),
        TransitionTaskRequest::new(second, "APPROVED", "carol"),
    ];
    world.last_batch = Some(run_async(world.batch.run(operations, false)));
}
