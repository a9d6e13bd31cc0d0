//! Task creation and metadata update specs.

use crate::prelude::*;

fn task_id(value: &serde_json::Value) -> String {
    value
        .get("id")
        .or_else(|| value.get("task_id"))
        .and_then(|v| v.as_str())
        .expect("created task should carry an id")
        .to_string()
}

#[test]
fn creating_a_task_returns_an_id() {
    let project = Project::empty();
    project.register("p1");

    let value = project
        .ojp()
        .args(&["-o", "json", "task", "create", "--project", "p1", "do the thing"])
        .passes()
        .json();
    assert!(!task_id(&value).is_empty());
}

#[test]
fn setting_task_status_round_trips() {
    let project = Project::empty();
    project.register("p1");

    let created = project
        .ojp()
        .args(&["-o", "json", "task", "create", "--project", "p1", "do the thing"])
        .passes()
        .json();
    let id = task_id(&created);

    let updated = project
        .ojp()
        .args(&["-o", "json", "task", "status", &id, "in-progress"])
        .passes()
        .json();
    assert_eq!(
        updated.get("status").and_then(|v| v.as_str()),
        Some("in-progress")
    );
}

#[test]
fn title_longer_than_256_chars_is_rejected() {
    let project = Project::empty();
    project.register("p1");

    let long_title = "x".repeat(300);
    project
        .ojp()
        .args(&["task", "create", "--project", "p1", &long_title])
        .fails();
}

#[test]
fn deriving_a_child_task_links_it_to_the_parent() {
    let project = Project::empty();
    project.register("p1");

    let parent = project
        .ojp()
        .args(&["-o", "json", "task", "create", "--project", "p1", "parent"])
        .passes()
        .json();
    let parent_id = task_id(&parent);

    let child = project
        .ojp()
        .args(&[
            "-o", "json", "task", "derive", &parent_id, "--project", "p1", "child",
        ])
        .passes()
        .json();
    assert!(!task_id(&child).is_empty());
}
