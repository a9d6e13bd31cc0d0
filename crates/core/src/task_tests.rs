// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_task_is_pending_and_unflagged() {
    let t = Task::new(
        TaskId::new("t_1"),
        ProjectId::new("p1"),
        None,
        "Title".to_string(),
        100,
    );
    assert_eq!(t.status, TaskStatus::Pending);
    assert!(t.flag.is_none());
    assert!(!t.is_terminal());
    assert_eq!(t.last_modified, 100);
}

#[test]
fn terminal_statuses() {
    assert!(TaskStatus::Completed.is_terminal());
    assert!(TaskStatus::Failed.is_terminal());
    assert!(TaskStatus::Canceled.is_terminal());
    assert!(!TaskStatus::Running.is_terminal());
    assert!(!TaskStatus::WaitingChildren.is_terminal());
}

#[test]
fn title_validation_rejects_empty_and_overlong() {
    assert!(validate_title("ok").is_ok());
    assert!(validate_title("").is_err());
    let long = "x".repeat(MAX_TITLE_LEN + 1);
    assert_eq!(
        validate_title(&long).unwrap_err().code(),
        "INVALID_TITLE"
    );
}

#[test]
fn description_validation_rejects_overlong() {
    assert!(validate_description("fine").is_ok());
    let long = "x".repeat(MAX_DESCRIPTION_LEN + 1);
    assert!(validate_description(&long).is_err());
}

#[test]
fn flag_parses_known_values_and_rejects_unknown() {
    assert_eq!(TaskFlag::parse("").unwrap(), None);
    assert_eq!(TaskFlag::parse("success").unwrap(), Some(TaskFlag::Success));
    assert!(TaskFlag::parse("bogus").is_err());
}

#[test]
fn role_parses_known_values() {
    assert_eq!(TaskRole::from_str_relaxed("planner").unwrap(), TaskRole::Planner);
    assert_eq!(TaskRole::from_str_relaxed("executor").unwrap(), TaskRole::Executor);
    assert_eq!(TaskRole::from_str_relaxed("").unwrap(), TaskRole::Unset);
    assert!(TaskRole::from_str_relaxed("bogus").is_err());
}

#[test]
fn builder_produces_configured_task() {
    let t = Task::builder()
        .id("t_42")
        .project("proj")
        .status(TaskStatus::Running)
        .role(TaskRole::Planner)
        .build();
    assert_eq!(t.task_id, TaskId::new("t_42"));
    assert_eq!(t.status, TaskStatus::Running);
    assert_eq!(t.task_role, TaskRole::Planner);
}
