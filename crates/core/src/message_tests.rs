// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn auto_progress_mark_defaults_to_zero() {
    let mark = TaskAutoProgressMark::default();
    assert_eq!(mark.observed_last_active_at, 0);
}

#[test]
fn message_roundtrips_through_json() {
    let msg = TaskMessage {
        task_id: TaskId::new("t_1"),
        seq: 1,
        role: MessageRole::User,
        content: "hi".to_string(),
        status: MessageStatus::Completed,
        error: None,
        created_at: 5,
    };
    let json = serde_json::to_string(&msg).unwrap();
    let back: TaskMessage = serde_json::from_str(&json).unwrap();
    assert_eq!(back.content, "hi");
    assert_eq!(back.status, MessageStatus::Completed);
}
