// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::context::TestContext;
use ojp_core::{RunStatus, SidecarMode, TaskStatus};

#[tokio::test]
async fn create_root_pane_binds_a_fresh_pane_and_starts_a_run() {
    let tc = TestContext::new();
    tc.register_project("p1");

    let task = create_root_pane(&tc.ctx, "p1", "Root task").await.expect("create root pane");

    let state = tc.ctx.state.lock();
    assert_eq!(state.tasks[task.task_id.as_str()].status, TaskStatus::Running);
    let binding = state.pane_binding_for_task(task.task_id.as_str()).expect("pane binding");
    assert!(binding.pane_target.starts_with("fake-"));
    let run = state
        .runs
        .values()
        .find(|r| r.task_id.as_str() == task.task_id.as_str())
        .expect("run created");
    assert_eq!(run.run_status, RunStatus::Running);
    assert!(state.live_binding_for_run(run.run_id.as_str()).is_some());
}

#[tokio::test]
async fn create_sibling_pane_shares_the_targets_parent() {
    let tc = TestContext::new();
    tc.register_project("p1");
    let parent = create_root_pane(&tc.ctx, "p1", "Parent").await.expect("create root");
    let child_of_parent = crate::tasks::create_task(&tc.ctx, "p1", Some(parent.task_id.as_str()), "First child")
        .await
        .expect("create first child");

    let sibling = create_sibling_pane(&tc.ctx, "p1", child_of_parent.task_id.as_str(), "Sibling")
        .await
        .expect("create sibling pane");

    assert_eq!(sibling.parent_task_id, child_of_parent.parent_task_id);
}

#[tokio::test]
async fn create_child_pane_is_parented_to_its_target() {
    let tc = TestContext::new();
    tc.register_project("p1");
    let target = create_root_pane(&tc.ctx, "p1", "Target").await.expect("create root");

    let child = create_child_pane(&tc.ctx, "p1", target.task_id.as_str(), "Child")
        .await
        .expect("create child pane");

    assert_eq!(child.parent_task_id, Some(target.task_id.clone()));
}

#[tokio::test]
async fn create_child_pane_under_autopilot_parent_schedules_fallback() {
    let tc = TestContext::new();
    tc.register_project("p1");
    let parent = create_root_pane(&tc.ctx, "p1", "Parent").await.expect("create root");
    crate::tasks::set_autopilot(&tc.ctx, parent.task_id.as_str(), true).expect("enable autopilot");
    {
        let mut state = tc.ctx.state.lock();
        state.tasks.get_mut(parent.task_id.as_str()).unwrap().sidecar_mode = SidecarMode::Autopilot;
    }

    let child = create_child_pane(&tc.ctx, "p1", parent.task_id.as_str(), "Child")
        .await
        .expect("create child pane");

    // The fallback timer is scheduled with a short delay in TestContext;
    // give the spawned task a chance to run and observe it did not panic.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(tc.ctx.state.lock().tasks.contains_key(child.task_id.as_str()));
}

#[tokio::test]
async fn manual_launch_pane_falls_back_to_login_shell_root_without_a_target() {
    let tc = TestContext::new();
    tc.register_project("p1");

    let task = manual_launch_pane(&tc.ctx, "p1", None, "Manual").await.expect("manual launch");

    let calls = tc.multiplexer.calls();
    assert!(calls
        .iter()
        .any(|c| matches!(c, ojp_adapters::MultiplexerCall::CreateRootLoginShell { .. })));
    assert_eq!(
        tc.ctx.state.lock().tasks[task.task_id.as_str()].status,
        TaskStatus::Running
    );
}

#[tokio::test]
async fn manual_launch_pane_opens_a_login_shell_sibling_when_target_has_a_pane() {
    let tc = TestContext::new();
    tc.register_project("p1");
    let target = create_root_pane(&tc.ctx, "p1", "Target").await.expect("create root");

    manual_launch_pane(&tc.ctx, "p1", Some(target.task_id.as_str()), "Manual")
        .await
        .expect("manual launch");

    let calls = tc.multiplexer.calls();
    assert!(calls
        .iter()
        .any(|c| matches!(c, ojp_adapters::MultiplexerCall::CreateSiblingLoginShell { .. })));
}

#[tokio::test]
async fn reopen_pane_replaces_the_existing_binding() {
    let tc = TestContext::new();
    tc.register_project("p1");
    let task = create_root_pane(&tc.ctx, "p1", "Task").await.expect("create root");
    let old_target = tc
        .ctx
        .state
        .lock()
        .pane_binding_for_task(task.task_id.as_str())
        .expect("binding")
        .pane_target
        .clone();

    reopen_pane(&tc.ctx, task.task_id.as_str()).await.expect("reopen");

    let new_target = tc
        .ctx
        .state
        .lock()
        .pane_binding_for_task(task.task_id.as_str())
        .expect("binding")
        .pane_target
        .clone();
    assert_ne!(old_target, new_target);
    assert!(tc
        .multiplexer
        .calls()
        .iter()
        .any(|c| matches!(c, ojp_adapters::MultiplexerCall::ClosePane { target } if *target == old_target)));
}

#[tokio::test]
async fn adopt_pane_rejects_an_already_bound_pane_target() {
    let tc = TestContext::new();
    tc.register_project("p1");
    let existing = create_root_pane(&tc.ctx, "p1", "Existing").await.expect("create root");
    let bound_target = tc
        .ctx
        .state
        .lock()
        .pane_binding_for_task(existing.task_id.as_str())
        .expect("binding")
        .pane_target
        .clone();
    let parent = create_root_pane(&tc.ctx, "p1", "Parent").await.expect("create root");

    let err = adopt_pane(
        &tc.ctx,
        "p1",
        parent.task_id.as_str(),
        "Adopted",
        ojp_core::TaskRole::Executor,
        "%99",
        &bound_target,
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "PANE_ALREADY_BOUND");
}

#[tokio::test]
async fn adopt_pane_binds_an_externally_created_pane() {
    let tc = TestContext::new();
    tc.register_project("p1");
    let parent = create_root_pane(&tc.ctx, "p1", "Parent").await.expect("create root");

    let adopted = adopt_pane(
        &tc.ctx,
        "p1",
        parent.task_id.as_str(),
        "Adopted",
        ojp_core::TaskRole::Executor,
        "%42",
        "ext:0.0",
    )
    .await
    .expect("adopt pane");

    let state = tc.ctx.state.lock();
    assert_eq!(state.tasks[adopted.task_id.as_str()].task_role, ojp_core::TaskRole::Executor);
    assert_eq!(
        state.pane_binding_for_task(adopted.task_id.as_str()).unwrap().pane_target,
        "ext:0.0"
    );
}

#[tokio::test]
async fn adopt_pane_picks_up_the_multiplexers_current_command() {
    let tc = TestContext::new();
    tc.register_project("p1");
    let parent = create_root_pane(&tc.ctx, "p1", "Parent").await.expect("create root");
    tc.multiplexer.seed_current_command("ext:0.1", "vim");

    let adopted = adopt_pane(
        &tc.ctx,
        "p1",
        parent.task_id.as_str(),
        "Adopted",
        ojp_core::TaskRole::Executor,
        "%43",
        "ext:0.1",
    )
    .await
    .expect("adopt pane");

    let state = tc.ctx.state.lock();
    assert_eq!(state.tasks[adopted.task_id.as_str()].current_command, "vim");
}

#[tokio::test]
async fn get_task_pane_backfills_a_missing_pane_uuid() {
    let tc = TestContext::new();
    tc.register_project("p1");
    let task = create_root_pane(&tc.ctx, "p1", "Task").await.expect("create root");
    {
        let mut state = tc.ctx.state.lock();
        state
            .pane_bindings
            .get_mut(task.task_id.as_str())
            .unwrap()
            .pane_uuid = ojp_core::PaneUuid::new("");
    }

    let view = get_task_pane(&tc.ctx, task.task_id.as_str()).await.expect("get task pane");
    assert!(!view.binding.pane_uuid.as_str().is_empty());
    assert_eq!(
        tc.ctx
            .state
            .lock()
            .pane_binding_for_task(task.task_id.as_str())
            .unwrap()
            .pane_uuid
            .as_str(),
        view.binding.pane_uuid.as_str()
    );
}

#[tokio::test]
async fn get_task_pane_without_binding_fails() {
    let tc = TestContext::new();
    tc.register_project("p1");
    let task = crate::tasks::create_task(&tc.ctx, "p1", None, "No pane").await.expect("create task");
    let err = get_task_pane(&tc.ctx, task.task_id.as_str()).await.unwrap_err();
    assert_eq!(err.code(), "PANE_BINDING_NOT_FOUND");
}

#[tokio::test]
async fn capture_history_clamps_lines_to_the_allowed_range() {
    let tc = TestContext::new();
    tc.register_project("p1");
    let task = create_root_pane(&tc.ctx, "p1", "Task").await.expect("create root");
    let pane_target = tc
        .ctx
        .state
        .lock()
        .pane_binding_for_task(task.task_id.as_str())
        .unwrap()
        .pane_target
        .clone();
    tc.multiplexer.seed_history(&pane_target, "some output");

    capture_history(&tc.ctx, task.task_id.as_str(), Some(50)).await.expect("capture history");

    let calls = tc.multiplexer.calls();
    let captured = calls.iter().find_map(|c| match c {
        ojp_adapters::MultiplexerCall::CaptureHistory { lines, .. } => Some(*lines),
        _ => None,
    });
    assert_eq!(captured, Some(200));

    capture_history(&tc.ctx, task.task_id.as_str(), Some(999_999)).await.expect("capture history");
    let calls = tc.multiplexer.calls();
    let captured = calls.iter().rev().find_map(|c| match c {
        ojp_adapters::MultiplexerCall::CaptureHistory { lines, .. } => Some(*lines),
        _ => None,
    });
    assert_eq!(captured, Some(10_000));
}

#[test]
fn upsert_pane_snapshots_records_runtime_status_and_hash() {
    let tc = TestContext::new();
    let applied = upsert_pane_snapshots(
        &tc.ctx,
        vec![PaneSnapshotInput {
            pane_id: "%1".to_string(),
            runtime_status: RuntimeStatus::Ready,
            snapshot: "$ ".to_string(),
            current_command: "zsh".to_string(),
            has_cursor: true,
            cursor_x: 2,
            cursor_y: 0,
        }],
    )
    .expect("upsert snapshots");
    assert_eq!(applied, 1);

    let state = tc.ctx.state.lock();
    let snapshot = state.pane_snapshots.get("%1").expect("snapshot recorded");
    assert_eq!(snapshot.runtime_status, RuntimeStatus::Ready);
    assert!(!snapshot.snapshot_hash.is_empty());
    assert_eq!(snapshot.snapshot, "$ ");
    assert_eq!(snapshot.current_command, "zsh");
    assert!(snapshot.has_cursor);
    assert_eq!(snapshot.cursor_x, 2);
}

#[test]
fn upsert_pane_snapshots_overwrites_prior_viewport_and_cursor() {
    let tc = TestContext::new();
    upsert_pane_snapshots(
        &tc.ctx,
        vec![PaneSnapshotInput {
            pane_id: "%2".to_string(),
            runtime_status: RuntimeStatus::Running,
            snapshot: "running build...".to_string(),
            current_command: "cargo".to_string(),
            has_cursor: false,
            cursor_x: 0,
            cursor_y: 0,
        }],
    )
    .expect("first upsert");
    upsert_pane_snapshots(
        &tc.ctx,
        vec![PaneSnapshotInput {
            pane_id: "%2".to_string(),
            runtime_status: RuntimeStatus::Ready,
            snapshot: "$ ".to_string(),
            current_command: "zsh".to_string(),
            has_cursor: true,
            cursor_x: 2,
            cursor_y: 3,
        }],
    )
    .expect("second upsert");

    let state = tc.ctx.state.lock();
    let snapshot = state.pane_snapshots.get("%2").expect("snapshot recorded");
    assert_eq!(snapshot.runtime_status, RuntimeStatus::Ready);
    assert_eq!(snapshot.snapshot, "$ ");
    assert_eq!(snapshot.current_command, "zsh");
    assert!(snapshot.has_cursor);
    assert_eq!(snapshot.cursor_x, 2);
    assert_eq!(snapshot.cursor_y, 3);
}
