//! Server configuration specs.

use crate::prelude::*;

#[test]
fn config_get_returns_defaults() {
    let project = Project::empty();
    project.register("p1");

    let value = project
        .ojp()
        .args(&["-o", "json", "config", "get"])
        .passes()
        .json();
    assert!(value.get("port").is_some());
}

#[test]
fn config_set_persists_a_field() {
    let project = Project::empty();
    project.register("p1");

    project
        .ojp()
        .args(&[
            "-o",
            "json",
            "config",
            "set",
            "--notify-command",
            "notify-send",
        ])
        .passes();

    let value = project
        .ojp()
        .args(&["-o", "json", "config", "get"])
        .passes()
        .json();
    assert_eq!(
        value.get("notify_command").and_then(|v| v.as_str()),
        Some("notify-send")
    );
}
