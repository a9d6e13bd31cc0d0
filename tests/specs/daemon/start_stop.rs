//! Daemon lifecycle specs.

use crate::prelude::*;

#[test]
fn daemon_status_is_not_running_before_anything_starts_it() {
    let project = Project::empty();
    project
        .ojp()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("not running");
}

#[test]
fn daemon_auto_starts_on_first_action_and_status_reflects_it() {
    let project = Project::empty();
    project.register("p1");

    project
        .ojp()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("is running");
}

#[test]
fn daemon_stop_tears_down_a_running_daemon() {
    let project = Project::empty();
    project.register("p1");

    project
        .ojp()
        .args(&["daemon", "stop"])
        .passes()
        .stdout_has("stopped");

    project
        .ojp()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("not running");
}
