//! Project registration specs.

use crate::prelude::*;

#[test]
fn registering_a_project_succeeds_and_echoes_the_id() {
    let project = Project::empty();
    project
        .ojp()
        .args(&["project", "register", "--id", "p1", "--repo-root"])
        .args(&[project.path().to_str().unwrap()])
        .passes()
        .stdout_has("p1");
}

#[test]
fn registering_the_same_project_twice_fails() {
    let project = Project::empty();
    project.register("p1");

    project
        .ojp()
        .args(&["project", "register", "--id", "p1", "--repo-root"])
        .args(&[project.path().to_str().unwrap()])
        .fails();
}

#[test]
fn project_tree_on_an_empty_project_is_empty() {
    let project = Project::empty();
    project.register("p1");

    let value = project
        .ojp()
        .args(&["-o", "json", "project", "tree", "p1"])
        .passes()
        .json();
    assert!(value.is_object() || value.is_array());
}

#[test]
fn project_tree_text_output_renders_a_table_with_nested_task_titles() {
    let project = Project::empty();
    project.register("p1");

    let parent = project
        .ojp()
        .args(&["-o", "json", "task", "create", "--project", "p1", "root task"])
        .passes()
        .json();
    let parent_id = parent
        .get("task_id")
        .and_then(|v| v.as_str())
        .expect("created task should carry a task_id")
        .to_string();

    project
        .ojp()
        .args(&[
            "-o", "json", "task", "derive", &parent_id, "--project", "p1", "child task",
        ])
        .passes();

    project
        .ojp()
        .args(&["project", "tree", "p1"])
        .passes()
        .stdout_has("STATUS")
        .stdout_has("root task")
        .stdout_has("  child task");
}
