// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task timeline messages and the auto-progress dedup mark.

use crate::task::TaskId;
use serde::{Deserialize, Serialize};

/// Who wrote a timeline message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Lifecycle status of a single timeline message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Running,
    Completed,
    Failed,
}

/// One row in a task's conversation timeline.
///
/// Assistant content is itself a JSON envelope (`{text, tools?, meta?}`);
/// this type stores it pre-serialized so the supervisor doesn't need to
/// know the envelope's full shape to append a row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskMessage {
    pub task_id: TaskId,
    pub seq: u64,
    pub role: MessageRole,
    pub content: String,
    pub status: MessageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: u64,
}

/// Last-accepted `observed_last_active_at` for a task, used by
/// `TryMarkTaskAutoProgressObserved` (§4.A) to deduplicate repeated
/// pane-actor triggers for the same observed idle moment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct TaskAutoProgressMark {
    pub observed_last_active_at: u64,
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
