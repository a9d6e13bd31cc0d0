//! Root pane creation specs.
//!
//! These run against a real `tmux` via the CLI, so they only assert on
//! the shape of the response rather than pane contents.

use crate::prelude::*;

#[test]
fn root_pane_creation_returns_the_bound_task() {
    let project = Project::empty();
    project.register("p1");

    let value = project
        .ojp()
        .args(&["-o", "json", "pane", "root", "--project", "p1", "main"])
        .passes()
        .json();
    assert!(value.get("task_id").is_some());
    assert_eq!(value.get("title").and_then(|v| v.as_str()), Some("main"));
}
