//! CLI help output specs.
//!
//! Verify help text displays for the resource subcommands.

use crate::prelude::*;

#[test]
fn ojp_no_args_shows_usage_and_exits_zero() {
    cli().passes().stdout_has("Usage:");
}

#[test]
fn ojp_help_shows_usage() {
    cli().args(&["--help"]).passes().stdout_has("Usage:");
}

#[test]
fn ojp_help_lists_resources() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("project")
        .stdout_has("task")
        .stdout_has("pane")
        .stdout_has("run");
}

#[test]
fn ojp_daemon_help_shows_subcommands() {
    cli()
        .args(&["daemon", "--help"])
        .passes()
        .stdout_has("start")
        .stdout_has("stop")
        .stdout_has("status");
}

#[test]
fn ojp_task_help_shows_subcommands() {
    cli()
        .args(&["task", "--help"])
        .passes()
        .stdout_has("create")
        .stdout_has("derive")
        .stdout_has("status");
}
