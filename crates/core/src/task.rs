// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task entity: a node in a project's task forest, bound at most once to a
//! pane and accumulating runs and messages over its lifetime.

use crate::error::CoreError;
use crate::project::ProjectId;
use serde::{Deserialize, Serialize};
use std::fmt;

crate::define_id! {
    /// Globally unique task identifier, minted with prefix `t_`.
    pub struct TaskId;
}

impl TaskId {
    /// Mint a fresh task id from a generated unique suffix.
    pub fn generate(id_gen: &impl crate::id::IdGen) -> Self {
        Self::new(format!("t_{}", id_gen.next()))
    }
}

pub const MAX_TITLE_LEN: usize = 256;
pub const MAX_DESCRIPTION_LEN: usize = 20_000;

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    WaitingUser,
    WaitingChildren,
    Completed,
    Failed,
    Canceled,
}

impl TaskStatus {
    /// Terminal statuses: completed, failed, canceled.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Canceled
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::WaitingUser => "waiting_user",
            TaskStatus::WaitingChildren => "waiting_children",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Canceled => "canceled",
        };
        write!(f, "{s}")
    }
}

/// Whether a task may plan-and-delegate or must execute directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskRole {
    Planner,
    Executor,
    Unset,
}

impl TaskRole {
    pub fn from_str_relaxed(s: &str) -> Result<Self, CoreError> {
        match s {
            "planner" => Ok(TaskRole::Planner),
            "executor" => Ok(TaskRole::Executor),
            "" | "unset" => Ok(TaskRole::Unset),
            other => Err(CoreError::InvalidTaskRole(other.to_string())),
        }
    }
}

/// Out-of-band signal a task raises for the user: success, notify, or error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskFlag {
    Success,
    Notify,
    Error,
}

impl TaskFlag {
    pub fn parse(s: &str) -> Result<Option<Self>, CoreError> {
        match s {
            "" => Ok(None),
            "success" => Ok(Some(TaskFlag::Success)),
            "notify" => Ok(Some(TaskFlag::Notify)),
            "error" => Ok(Some(TaskFlag::Error)),
            other => Err(CoreError::InvalidFlag(other.to_string())),
        }
    }
}

impl fmt::Display for TaskFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskFlag::Success => "success",
            TaskFlag::Notify => "notify",
            TaskFlag::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// Governs how proactive the control plane is for this task's subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SidecarMode {
    #[default]
    Advisor,
    Observer,
    Autopilot,
}

/// A node in a project's task forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub task_id: TaskId,
    pub project_id: ProjectId,
    pub parent_task_id: Option<TaskId>,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub task_role: TaskRole,
    pub flag: Option<TaskFlag>,
    pub flag_desc: String,
    pub flag_readed: bool,
    pub checked: bool,
    pub archived: bool,
    pub current_command: String,
    /// Epoch seconds; advances on every mutation (invariant 4).
    pub last_modified: u64,
    pub sidecar_mode: SidecarMode,
    /// Number of direct children not yet in a terminal status.
    #[serde(default)]
    pub pending_children_count: u32,
}

impl Task {
    /// Construct a new pending root or child task.
    ///
    /// Does not validate title/description length; callers validate at the
    /// service boundary (`ojp-engine::tasks`) so the error surfaces with
    /// request context.
    pub fn new(
        task_id: TaskId,
        project_id: ProjectId,
        parent_task_id: Option<TaskId>,
        title: String,
        now_secs: u64,
    ) -> Self {
        Self {
            task_id,
            project_id,
            parent_task_id,
            title,
            description: String::new(),
            status: TaskStatus::Pending,
            task_role: TaskRole::Unset,
            flag: None,
            flag_desc: String::new(),
            flag_readed: true,
            checked: false,
            archived: false,
            current_command: String::new(),
            last_modified: now_secs,
            sidecar_mode: SidecarMode::Advisor,
            pending_children_count: 0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.is_empty() || title.chars().count() > MAX_TITLE_LEN {
        return Err(CoreError::TitleTooLong(title.chars().count()));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), CoreError> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(CoreError::DescriptionTooLong(description.chars().count()));
    }
    Ok(())
}

#[cfg(any(test, feature = "test-support"))]
pub struct TaskBuilder {
    task_id: String,
    project_id: String,
    parent_task_id: Option<String>,
    title: String,
    status: TaskStatus,
    task_role: TaskRole,
    sidecar_mode: SidecarMode,
    last_modified: u64,
}

#[cfg(any(test, feature = "test-support"))]
impl Default for TaskBuilder {
    fn default() -> Self {
        Self {
            task_id: "t_1".to_string(),
            project_id: "p1".to_string(),
            parent_task_id: None,
            title: "Task".to_string(),
            status: TaskStatus::Pending,
            task_role: TaskRole::Unset,
            sidecar_mode: SidecarMode::Advisor,
            last_modified: 0,
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl TaskBuilder {
    pub fn id(mut self, v: impl Into<String>) -> Self {
        self.task_id = v.into();
        self
    }
    pub fn project(mut self, v: impl Into<String>) -> Self {
        self.project_id = v.into();
        self
    }
    pub fn parent(mut self, v: impl Into<String>) -> Self {
        self.parent_task_id = Some(v.into());
        self
    }
    pub fn status(mut self, v: TaskStatus) -> Self {
        self.status = v;
        self
    }
    pub fn role(mut self, v: TaskRole) -> Self {
        self.task_role = v;
        self
    }
    pub fn sidecar_mode(mut self, v: SidecarMode) -> Self {
        self.sidecar_mode = v;
        self
    }
    pub fn build(self) -> Task {
        let mut t = Task::new(
            TaskId::new(self.task_id),
            ProjectId::new(self.project_id),
            self.parent_task_id.map(TaskId::new),
            self.title,
            self.last_modified,
        );
        t.status = self.status;
        t.task_role = self.task_role;
        t.sidecar_mode = self.sidecar_mode;
        t
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Task {
    pub fn builder() -> TaskBuilder {
        TaskBuilder::default()
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
