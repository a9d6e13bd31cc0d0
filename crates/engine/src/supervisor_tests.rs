// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::context::NullPublisher;
use ojp_adapters::FakeAgentLoopRunner;
use ojp_core::FakeClock;
use ojp_storage::MaterializedState;
use std::time::Duration;

fn wal(dir: &tempfile::TempDir) -> Arc<Mutex<Wal>> {
    Arc::new(Mutex::new(
        Wal::open(&dir.path().join("wal.jsonl"), 0).expect("open wal"),
    ))
}

fn event(task_id: &str) -> SupervisorEvent {
    SupervisorEvent {
        task_id: task_id.to_string(),
        project_id: "p1".to_string(),
        source: "user_input".to_string(),
        display_content: "hi".to_string(),
        agent_prompt: "do the thing".to_string(),
        trigger_meta: HashMap::new(),
        cancel: CancellationToken::new(),
    }
}

async fn wait_for_assistant(state: &Arc<Mutex<MaterializedState>>, task_id: &str) -> ojp_core::TaskMessage {
    for _ in 0..200 {
        if let Some(messages) = state.lock().task_messages.get(task_id) {
            if let Some(m) = messages.iter().find(|m| m.role == MessageRole::Assistant) {
                if m.status != MessageStatus::Running {
                    return m.clone();
                }
            }
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("assistant message never settled");
}

#[tokio::test]
async fn enqueue_fails_closed_without_runner() {
    let dir = tempfile::tempdir().expect("tempdir");
    let supervisor = Supervisor::new(
        Arc::new(Mutex::new(MaterializedState::default())),
        wal(&dir),
        Arc::new(FakeClock::new()),
        None,
        Arc::new(NullPublisher),
    );

    let err = supervisor.enqueue(event("t_1")).unwrap_err();
    assert_eq!(err.code(), "AGENT_LOOP_UNAVAILABLE");
}

#[tokio::test]
async fn successful_turn_inserts_user_then_assistant_messages() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = Arc::new(Mutex::new(MaterializedState::default()));
    let runner = FakeAgentLoopRunner::new();
    runner.push_response("assistant reply");
    let supervisor = Supervisor::new(
        state.clone(),
        wal(&dir),
        Arc::new(FakeClock::new()),
        Some(Arc::new(runner)),
        Arc::new(NullPublisher),
    );

    supervisor.enqueue(event("t_1")).expect("enqueue");
    let assistant = wait_for_assistant(&state, "t_1").await;

    assert_eq!(assistant.status, MessageStatus::Completed);
    assert_eq!(assistant.content, "assistant reply");

    let messages = state.lock().task_messages.get("t_1").cloned().unwrap_or_default();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, MessageRole::User);
    assert_eq!(messages[0].content, "hi");
    assert_eq!(messages[0].status, MessageStatus::Completed);
    assert_eq!(messages[1].role, MessageRole::Assistant);
}

#[tokio::test]
async fn failed_run_marks_assistant_message_failed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = Arc::new(Mutex::new(MaterializedState::default()));
    let runner = FakeAgentLoopRunner::new();
    runner.push_error("boom");
    let supervisor = Supervisor::new(
        state.clone(),
        wal(&dir),
        Arc::new(FakeClock::new()),
        Some(Arc::new(runner)),
        Arc::new(NullPublisher),
    );

    supervisor.enqueue(event("t_1")).expect("enqueue");
    let assistant = wait_for_assistant(&state, "t_1").await;

    assert_eq!(assistant.status, MessageStatus::Failed);
    assert_eq!(assistant.error.as_deref(), Some("agent run failed: boom"));
}

#[tokio::test]
async fn two_tasks_run_independently_in_fifo_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = Arc::new(Mutex::new(MaterializedState::default()));
    let runner = FakeAgentLoopRunner::new();
    runner.push_response("r1");
    runner.push_response("r2");
    runner.push_response("r3");
    let supervisor = Supervisor::new(
        state.clone(),
        wal(&dir),
        Arc::new(FakeClock::new()),
        Some(Arc::new(runner)),
        Arc::new(NullPublisher),
    );

    supervisor.enqueue(event("t_1")).expect("enqueue 1");
    supervisor.enqueue(event("t_1")).expect("enqueue 2");
    supervisor.enqueue(event("t_2")).expect("enqueue 3");

    for _ in 0..200 {
        let done = {
            let s = state.lock();
            let t1 = s.task_messages.get("t_1").map(|m| m.len()).unwrap_or(0) == 4;
            let t2 = s.task_messages.get("t_2").map(|m| m.len()).unwrap_or(0) == 2;
            t1 && t2
        };
        if done {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let s = state.lock();
    assert_eq!(s.task_messages.get("t_1").map(Vec::len), Some(4));
    assert_eq!(s.task_messages.get("t_2").map(Vec::len), Some(2));
}

#[tokio::test]
async fn canceled_event_marks_pending_assistant_message_failed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = Arc::new(Mutex::new(MaterializedState::default()));
    let runner = FakeAgentLoopRunner::new();
    let supervisor = Supervisor::new(
        state.clone(),
        wal(&dir),
        Arc::new(FakeClock::new()),
        Some(Arc::new(runner)),
        Arc::new(NullPublisher),
    );

    let mut ev = event("t_1");
    ev.cancel.cancel();
    supervisor.enqueue(ev).expect("enqueue");
    let assistant = wait_for_assistant(&state, "t_1").await;

    assert_eq!(assistant.status, MessageStatus::Failed);
}
