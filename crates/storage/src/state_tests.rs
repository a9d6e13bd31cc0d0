// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ojp_core::{MessageRole, PaneUuid, RunId, TaskId};

fn create_task(state: &mut MaterializedState, id: &str, parent: Option<&str>) {
    state.apply_event(&Event::TaskCreated {
        task_id: TaskId::new(id.to_string()),
        project_id: "p1".to_string(),
        parent_task_id: parent.map(|p| TaskId::new(p.to_string())),
        title: format!("task {id}"),
        at: 0,
    });
}

#[test]
fn task_created_is_idempotent() {
    let mut state = MaterializedState::default();
    let event = Event::TaskCreated {
        task_id: TaskId::new("t_1"),
        project_id: "p1".to_string(),
        parent_task_id: None,
        title: "Title".to_string(),
        at: 0,
    };
    state.apply_event(&event);
    state.apply_event(&event);
    assert_eq!(state.tasks.len(), 1);
}

#[test]
fn child_creation_increments_parent_pending_count() {
    let mut state = MaterializedState::default();
    create_task(&mut state, "t_1", None);
    create_task(&mut state, "t_2", Some("t_1"));
    assert_eq!(state.tasks["t_1"].pending_children_count, 1);
}

#[test]
fn status_change_to_terminal_decrements_parent_pending_count() {
    let mut state = MaterializedState::default();
    create_task(&mut state, "t_1", None);
    create_task(&mut state, "t_2", Some("t_1"));

    state.apply_event(&Event::TaskStatusChanged {
        task_id: TaskId::new("t_2"),
        status: ojp_core::TaskStatus::Completed,
        at: 1,
    });
    assert_eq!(state.tasks["t_1"].pending_children_count, 0);

    // Applying the same transition again must not double-decrement.
    state.apply_event(&Event::TaskStatusChanged {
        task_id: TaskId::new("t_2"),
        status: ojp_core::TaskStatus::Completed,
        at: 2,
    });
    assert_eq!(state.tasks["t_1"].pending_children_count, 0);
}

#[test]
fn flag_update_always_resets_flag_readed() {
    let mut state = MaterializedState::default();
    create_task(&mut state, "t_1", None);
    state.apply_event(&Event::TaskFlagUpdated {
        task_id: TaskId::new("t_1"),
        flag: Some(ojp_core::TaskFlag::Notify),
        flag_desc: "heads up".to_string(),
        at: 1,
    });
    assert!(!state.tasks["t_1"].flag_readed);
}

#[test]
fn pane_created_then_closed_removes_binding() {
    let mut state = MaterializedState::default();
    create_task(&mut state, "t_1", None);
    state.apply_event(&Event::PaneCreated {
        task_id: TaskId::new("t_1"),
        pane_uuid: PaneUuid::new("pu_1"),
        pane_id: "%1".to_string(),
        pane_target: "e2e:1.1".to_string(),
    });
    assert!(state.pane_binding_for_task("t_1").is_some());
    assert!(state.task_for_pane_target("e2e:1.1").is_some());

    state.apply_event(&Event::PaneClosed {
        task_id: TaskId::new("t_1"),
    });
    assert!(state.pane_binding_for_task("t_1").is_none());
}

#[test]
fn run_binding_marked_stale_on_terminal_run_status() {
    let mut state = MaterializedState::default();
    create_task(&mut state, "t_1", None);
    state.apply_event(&Event::RunCreated {
        run_id: RunId::new("r_1"),
        task_id: TaskId::new("t_1"),
    });
    state.apply_event(&Event::RunBindingUpserted {
        run_id: RunId::new("r_1"),
        server_instance_id: "srv_a".to_string(),
        pane_id: "%1".to_string(),
        pane_target: "e2e:1.1".to_string(),
    });
    assert!(state.live_binding_for_run("r_1").is_some());

    state.apply_event(&Event::RunStatusChanged {
        run_id: RunId::new("r_1"),
        status: ojp_core::RunStatus::Completed,
    });
    assert!(state.live_binding_for_run("r_1").is_none());
}

#[test]
fn task_message_appended_is_deduped_by_seq() {
    let mut state = MaterializedState::default();
    create_task(&mut state, "t_1", None);
    let event = Event::TaskMessageAppended {
        task_id: TaskId::new("t_1"),
        seq: 1,
        role: MessageRole::User,
        content: "hello".to_string(),
        created_at: 0,
    };
    state.apply_event(&event);
    state.apply_event(&event);
    assert_eq!(state.task_messages["t_1"].len(), 1);
}

#[test]
fn task_message_status_changed_updates_existing_row() {
    let mut state = MaterializedState::default();
    create_task(&mut state, "t_1", None);
    state.apply_event(&Event::TaskMessageAppended {
        task_id: TaskId::new("t_1"),
        seq: 1,
        role: MessageRole::Assistant,
        content: String::new(),
        created_at: 0,
    });
    state.apply_event(&Event::TaskMessageStatusChanged {
        task_id: TaskId::new("t_1"),
        seq: 1,
        status: ojp_core::MessageStatus::Completed,
        content: Some("done".to_string()),
        error: None,
    });
    let msg = &state.task_messages["t_1"][0];
    assert_eq!(msg.status, ojp_core::MessageStatus::Completed);
    assert_eq!(msg.content, "done");
}

#[test]
fn pm_session_created_is_idempotent_and_scoped_per_project() {
    let mut state = MaterializedState::default();
    let event = Event::PmSessionCreated {
        pm_session_id: ojp_core::PMSessionId::new("pm_1"),
        project_id: "p1".to_string(),
        title: "Kickoff".to_string(),
        at: 0,
    };
    state.apply_event(&event);
    state.apply_event(&event);
    assert_eq!(state.pm_sessions_for_project("p1").len(), 1);
    assert!(state.pm_sessions_for_project("p2").is_empty());
}

#[test]
fn pm_message_appended_is_idempotent_by_seq() {
    let mut state = MaterializedState::default();
    let event = Event::PmMessageAppended {
        pm_session_id: ojp_core::PMSessionId::new("pm_1"),
        seq: 1,
        role: ojp_core::PMMessageRole::User,
        content: "hello".to_string(),
        created_at: 0,
    };
    state.apply_event(&event);
    state.apply_event(&event);
    assert_eq!(state.pm_messages_for_session("pm_1").len(), 1);
}

#[test]
fn get_task_resolves_unambiguous_prefix() {
    let mut state = MaterializedState::default();
    create_task(&mut state, "t_abc123", None);
    assert!(state.get_task("t_abc").is_some());
}

#[test]
fn get_task_rejects_ambiguous_prefix() {
    let mut state = MaterializedState::default();
    create_task(&mut state, "t_abc1", None);
    create_task(&mut state, "t_abc2", None);
    assert!(state.get_task("t_abc").is_none());
}
