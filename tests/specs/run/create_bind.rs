//! Run creation and pane-binding specs.

use crate::prelude::*;

fn task_id(value: &serde_json::Value) -> String {
    value
        .get("task_id")
        .and_then(|v| v.as_str())
        .expect("created task should carry a task_id")
        .to_string()
}

fn run_id(value: &serde_json::Value) -> String {
    value
        .get("run_id")
        .and_then(|v| v.as_str())
        .expect("created run should carry a run_id")
        .to_string()
}

#[test]
fn creating_a_run_for_a_task_succeeds() {
    let project = Project::empty();
    project.register("p1");

    let task = project
        .ojp()
        .args(&["-o", "json", "task", "create", "--project", "p1", "do it"])
        .passes()
        .json();
    let tid = task_id(&task);

    let run = project
        .ojp()
        .args(&["-o", "json", "run", "create", &tid])
        .passes()
        .json();
    assert!(!run_id(&run).is_empty());
}

#[test]
fn binding_a_run_to_a_pane_round_trips() {
    let project = Project::empty();
    project.register("p1");

    let task = project
        .ojp()
        .args(&["-o", "json", "task", "create", "--project", "p1", "do it"])
        .passes()
        .json();
    let tid = task_id(&task);

    let run = project
        .ojp()
        .args(&["-o", "json", "run", "create", &tid])
        .passes()
        .json();
    let rid = run_id(&run);

    project
        .ojp()
        .args(&["run", "bind-pane", &rid, "--pane", "e2e:1.1"])
        .passes();
}

#[test]
fn creating_a_run_for_an_unknown_task_fails() {
    let project = Project::empty();
    project.register("p1");

    project.ojp().args(&["run", "create", "t_missing"]).fails();
}
