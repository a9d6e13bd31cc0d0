// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project-manager chat session entities.
//!
//! The PM chat surface itself (the orchestration that drives a
//! conversation with an agent runner) is out of core scope, but
//! `PMSession`/`PMMessage` still belong in the data model, with the state
//! store responsible for them beyond their store surface. So this module
//! carries only the entity shapes and the store keys them by; nothing
//! here calls an `AgentLoopRunner` or serves an HTTP route.

use crate::project::ProjectId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Project-scoped chat session identifier, prefix `pm_`.
    pub struct PMSessionId;
}

/// A project-scoped chat thread with an agent runner, independent of any
/// task's timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PMSession {
    pub pm_session_id: PMSessionId,
    pub project_id: ProjectId,
    pub title: String,
    pub created_at: u64,
    pub last_modified: u64,
}

impl PMSession {
    pub fn new(pm_session_id: PMSessionId, project_id: ProjectId, title: String, at: u64) -> Self {
        Self {
            pm_session_id,
            project_id,
            title,
            created_at: at,
            last_modified: at,
        }
    }
}

/// Who wrote a PM session message. Mirrors `MessageRole` rather than
/// reusing it: a PM session has no `task_id` to hang a `TaskMessage` off
/// of, and the two timelines are not interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PMMessageRole {
    User,
    Assistant,
}

/// One row in a PM session's conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PMMessage {
    pub pm_session_id: PMSessionId,
    pub seq: u64,
    pub role: PMMessageRole,
    pub content: String,
    pub created_at: u64,
}

#[cfg(test)]
#[path = "pm_tests.rs"]
mod tests;
