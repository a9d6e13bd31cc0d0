// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::context::TestContext;

fn body(content: &str) -> MessageRequest {
    MessageRequest {
        content: content.to_string(),
        flag: String::new(),
        flag_desc: String::new(),
    }
}

#[test]
fn parse_rejects_unknown_source() {
    let err = MessageSource::parse("smoke_signal").unwrap_err();
    assert_eq!(err.code(), "INVALID_MESSAGE_SOURCE");
}

#[tokio::test]
async fn post_message_rejects_unknown_task() {
    let tc = TestContext::new();
    let err = post_message(&tc.ctx, "t_missing", MessageSource::UserInput, body("hi"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "TASK_NOT_FOUND");
}

#[tokio::test]
async fn user_input_enqueues_one_user_and_one_assistant_message() {
    let tc = TestContext::new();
    tc.register_project("p1");
    let task = crate::panes::create_root_pane(&tc.ctx, "p1", "Root")
        .await
        .expect("create root pane");

    let outcome = post_message(&tc.ctx, task.task_id.as_str(), MessageSource::UserInput, body("hi"))
        .await
        .expect("post message");
    assert_eq!(outcome, MessagePostOutcome::Enqueued);

    // The supervisor worker is spawned onto the tokio runtime; give it a tick.
    tokio::task::yield_now().await;
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    let state = tc.ctx.state.lock();
    let timeline = state.task_messages.get(task.task_id.as_str()).cloned().unwrap_or_default();
    assert_eq!(timeline.iter().filter(|m| m.role == ojp_core::MessageRole::User).count(), 1);
    assert_eq!(
        timeline.iter().filter(|m| m.role == ojp_core::MessageRole::Assistant).count(),
        1
    );
}

#[tokio::test]
async fn user_input_without_agent_loop_fails_closed() {
    let tc = TestContext::without_agent_loop();
    tc.register_project("p1");
    let task = crate::panes::create_root_pane(&tc.ctx, "p1", "Root")
        .await
        .expect("create root pane");

    let err = post_message(&tc.ctx, task.task_id.as_str(), MessageSource::UserInput, body("hi"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "AGENT_LOOP_UNAVAILABLE");
}

#[tokio::test]
async fn task_set_flag_sets_flag_without_touching_supervisor() {
    let tc = TestContext::without_agent_loop();
    tc.register_project("p1");
    let task = crate::panes::create_root_pane(&tc.ctx, "p1", "Root")
        .await
        .expect("create root pane");

    let outcome = post_message(
        &tc.ctx,
        task.task_id.as_str(),
        MessageSource::TaskSetFlag,
        MessageRequest {
            content: String::new(),
            flag: "success".to_string(),
            flag_desc: "all good".to_string(),
        },
    )
    .await
    .expect("set flag");
    assert_eq!(outcome, MessagePostOutcome::FlagSet);

    let state = tc.ctx.state.lock();
    assert_eq!(state.tasks[task.task_id.as_str()].flag, Some(ojp_core::TaskFlag::Success));
}

#[tokio::test]
async fn tty_write_stdin_requires_a_pane_binding() {
    let tc = TestContext::without_agent_loop();
    tc.register_project("p1");
    let task = crate::tasks::create_task(&tc.ctx, "p1", None, "Unbound")
        .await
        .expect("create task");

    let err = post_message(&tc.ctx, task.task_id.as_str(), MessageSource::TtyWriteStdin, body("ls\n"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "PANE_BINDING_NOT_FOUND");
}

#[tokio::test]
async fn tty_write_stdin_writes_raw_input_to_the_bound_pane() {
    let tc = TestContext::without_agent_loop();
    tc.register_project("p1");
    let task = crate::panes::create_root_pane(&tc.ctx, "p1", "Root")
        .await
        .expect("create root pane");

    let outcome = post_message(&tc.ctx, task.task_id.as_str(), MessageSource::TtyWriteStdin, body("ls\n"))
        .await
        .expect("write stdin");
    assert_eq!(outcome, MessagePostOutcome::StdinWritten);
}
