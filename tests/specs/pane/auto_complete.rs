//! `AutoCompleteByPane` driven through the HTTP/CLI
//! surface a pane-idle watcher would actually use, rather than through the
//! real multiplexer.

use crate::prelude::*;

fn task_id(value: &serde_json::Value) -> String {
    value
        .get("task_id")
        .and_then(|v| v.as_str())
        .expect("created task should carry a task_id")
        .to_string()
}

#[test]
fn reporting_a_bound_pane_idle_completes_its_task() {
    let project = Project::empty();
    project.register("p1");

    let parent = project
        .ojp()
        .args(&["-o", "json", "task", "create", "--project", "p1", "root"])
        .passes()
        .json();
    let parent_id = task_id(&parent);

    let child = project
        .ojp()
        .args(&[
            "-o",
            "json",
            "task",
            "adopt-pane",
            &parent_id,
            "--project",
            "p1",
            "worker",
            "--pane-id",
            "%9",
            "--pane-target",
            "e2e:9.0",
        ])
        .passes()
        .json();
    let child_id = task_id(&child);

    let outcome = project
        .ojp()
        .args(&["-o", "json", "pane", "auto-complete", "e2e:9.0", "--trigger-source", "pane-idle"])
        .passes()
        .json();
    assert_eq!(outcome.get("triggered").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(outcome.get("status").and_then(|v| v.as_str()), Some("completed"));
    assert_eq!(outcome.get("task_id").and_then(|v| v.as_str()), Some(child_id.as_str()));
}

#[test]
fn reporting_an_unbound_pane_idle_is_skipped() {
    let project = Project::empty();
    project.register("p1");

    let outcome = project
        .ojp()
        .args(&["-o", "json", "pane", "auto-complete", "e2e:no-such-pane"])
        .passes()
        .json();
    assert_eq!(outcome.get("triggered").and_then(|v| v.as_bool()), Some(false));
}

#[test]
fn pane_actor_trigger_on_a_bound_pane_is_skipped_when_autopilot_is_off() {
    let project = Project::empty();
    project.register("p1");

    let parent = project
        .ojp()
        .args(&["-o", "json", "task", "create", "--project", "p1", "root"])
        .passes()
        .json();
    let parent_id = task_id(&parent);

    project
        .ojp()
        .args(&[
            "-o",
            "json",
            "task",
            "adopt-pane",
            &parent_id,
            "--project",
            "p1",
            "worker",
            "--pane-id",
            "%8",
            "--pane-target",
            "e2e:8.0",
        ])
        .passes();

    let outcome = project
        .ojp()
        .args(&[
            "-o",
            "json",
            "pane",
            "auto-complete",
            "e2e:8.0",
            "--trigger-source",
            "pane-actor",
        ])
        .passes()
        .json();
    assert_eq!(outcome.get("triggered").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(
        outcome.get("reason").and_then(|v| v.as_str()),
        Some("autopilot-disabled")
    );
}
