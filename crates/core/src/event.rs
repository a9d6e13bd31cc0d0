// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable event log vocabulary.
//!
//! Every state mutation the control plane makes is expressed as an
//! `Event` before it is applied to `MaterializedState` and appended to the
//! WAL — the single source of truth both for durability and for what the
//! pub/sub hub (§4.C) fans out to subscribers. `topic()` gives the
//! `entity.change`-shaped string the hub publishes under.

use crate::pane::{PaneUuid, RuntimeStatus};
use crate::run::{BindingStatus, RunId, RunStatus};
use crate::task::{TaskFlag, TaskId, TaskStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "project:registered")]
    ProjectRegistered {
        project_id: crate::project::ProjectId,
        repo_root: std::path::PathBuf,
        display_name: String,
        is_git_repo: bool,
    },

    #[serde(rename = "task:created")]
    TaskCreated {
        task_id: TaskId,
        project_id: String,
        parent_task_id: Option<TaskId>,
        title: String,
        at: u64,
    },
    #[serde(rename = "task:deleted")]
    TaskDeleted { task_id: TaskId },
    #[serde(rename = "task:status_changed")]
    TaskStatusChanged {
        task_id: TaskId,
        status: TaskStatus,
        at: u64,
    },
    #[serde(rename = "task:title_changed")]
    TaskTitleChanged {
        task_id: TaskId,
        title: String,
        at: u64,
    },
    #[serde(rename = "task:description_changed")]
    TaskDescriptionChanged {
        task_id: TaskId,
        description: String,
        at: u64,
    },
    #[serde(rename = "task:checked_changed")]
    TaskCheckedChanged {
        task_id: TaskId,
        checked: bool,
        at: u64,
    },
    #[serde(rename = "task:flag_updated")]
    TaskFlagUpdated {
        task_id: TaskId,
        flag: Option<TaskFlag>,
        flag_desc: String,
        at: u64,
    },
    #[serde(rename = "task:flag_readed_changed")]
    TaskFlagReadedChanged {
        task_id: TaskId,
        flag_readed: bool,
        at: u64,
    },
    #[serde(rename = "task:current_command_changed")]
    TaskCurrentCommandChanged {
        task_id: TaskId,
        current_command: String,
        at: u64,
    },
    #[serde(rename = "task:autopilot_changed")]
    TaskAutopilotChanged {
        task_id: TaskId,
        enabled: bool,
        at: u64,
    },
    #[serde(rename = "task:archived")]
    TaskArchived { task_id: TaskId },
    #[serde(rename = "task:tree_changed")]
    TaskTreeChanged { project_id: String },
    #[serde(rename = "task:auto_progress_observed")]
    TaskAutoProgressObserved {
        task_id: TaskId,
        observed_last_active_at: u64,
    },
    #[serde(rename = "task:return_reported")]
    TaskReturnReported {
        task_id: TaskId,
        run_id: Option<RunId>,
        summary: String,
    },

    #[serde(rename = "pane:created")]
    PaneCreated {
        task_id: TaskId,
        pane_uuid: PaneUuid,
        pane_id: String,
        pane_target: String,
    },
    #[serde(rename = "pane:uuid_backfilled")]
    PaneUuidBackfilled { task_id: TaskId, pane_uuid: PaneUuid },
    #[serde(rename = "pane:closed")]
    PaneClosed { task_id: TaskId },
    #[serde(rename = "pane:snapshot_updated")]
    PaneSnapshotUpdated {
        pane_id: String,
        runtime_status: RuntimeStatus,
        snapshot: String,
        snapshot_hash: String,
        current_command: String,
        has_cursor: bool,
        cursor_x: u32,
        cursor_y: u32,
        updated_at: u64,
    },

    #[serde(rename = "run:created")]
    RunCreated { run_id: RunId, task_id: TaskId },
    #[serde(rename = "run:status_changed")]
    RunStatusChanged { run_id: RunId, status: RunStatus },
    #[serde(rename = "run:binding_upserted")]
    RunBindingUpserted {
        run_id: RunId,
        server_instance_id: String,
        pane_id: String,
        pane_target: String,
    },
    #[serde(rename = "run:binding_marked_stale")]
    RunBindingMarkedStale { run_id: RunId, reason: String },
    #[serde(rename = "run:event_appended")]
    RunEventAppended {
        run_id: RunId,
        kind: String,
        at: u64,
    },

    #[serde(rename = "message:appended")]
    TaskMessageAppended {
        task_id: TaskId,
        seq: u64,
        role: crate::message::MessageRole,
        content: String,
        created_at: u64,
    },
    #[serde(rename = "message:status_changed")]
    TaskMessageStatusChanged {
        task_id: TaskId,
        seq: u64,
        status: crate::message::MessageStatus,
        content: Option<String>,
        error: Option<String>,
    },

    #[serde(rename = "pm_session:created")]
    PmSessionCreated {
        pm_session_id: crate::pm::PMSessionId,
        project_id: String,
        title: String,
        at: u64,
    },
    #[serde(rename = "pm_message:appended")]
    PmMessageAppended {
        pm_session_id: crate::pm::PMSessionId,
        seq: u64,
        role: crate::pm::PMMessageRole,
        content: String,
        created_at: u64,
    },

    /// Forward-compatibility catch-all, so unknown event kinds in a WAL
    /// written by a newer version don't fail replay on an older binary.
    #[serde(other, skip_serializing)]
    Custom,
}

impl Event {
    /// `entity.change`-shaped pub/sub topic for this event.
    pub fn topic(&self) -> &'static str {
        match self {
            Event::ProjectRegistered { .. } => "project.registered",
            Event::TaskCreated { .. }
            | Event::TaskStatusChanged { .. }
            | Event::TaskTitleChanged { .. }
            | Event::TaskDescriptionChanged { .. }
            | Event::TaskCheckedChanged { .. }
            | Event::TaskDeleted { .. } => "task.status.updated",
            Event::TaskFlagUpdated { .. } | Event::TaskFlagReadedChanged { .. } => {
                "task.flag.updated"
            }
            Event::TaskCurrentCommandChanged { .. } => "task.status.updated",
            Event::TaskAutopilotChanged { .. } => "task.autopilot.updated",
            Event::TaskArchived { .. } | Event::TaskTreeChanged { .. } => "task.tree.updated",
            Event::TaskAutoProgressObserved { .. } => "task.auto_progress.observed",
            Event::TaskReturnReported { .. } => "task.return.reported",
            Event::PaneCreated { .. } => "pane.created",
            Event::PaneUuidBackfilled { .. } | Event::PaneClosed { .. } => "pane.updated",
            Event::PaneSnapshotUpdated { .. } => "pane.snapshot.updated",
            Event::RunCreated { .. }
            | Event::RunStatusChanged { .. }
            | Event::RunBindingUpserted { .. }
            | Event::RunBindingMarkedStale { .. }
            | Event::RunEventAppended { .. } => "run.updated",
            Event::TaskMessageAppended { .. } | Event::TaskMessageStatusChanged { .. } => {
                "task.messages.updated"
            }
            Event::PmSessionCreated { .. } | Event::PmMessageAppended { .. } => {
                "project.pm.messages.updated"
            }
            Event::Custom => "unknown",
        }
    }

    /// Name for tracing spans/log lines.
    pub fn name(&self) -> &'static str {
        self.topic()
    }

    /// The task this event pertains to, when it pertains to exactly one.
    pub fn task_id(&self) -> Option<&TaskId> {
        match self {
            Event::TaskCreated { task_id, .. }
            | Event::TaskDeleted { task_id }
            | Event::TaskStatusChanged { task_id, .. }
            | Event::TaskTitleChanged { task_id, .. }
            | Event::TaskDescriptionChanged { task_id, .. }
            | Event::TaskCheckedChanged { task_id, .. }
            | Event::TaskFlagUpdated { task_id, .. }
            | Event::TaskFlagReadedChanged { task_id, .. }
            | Event::TaskCurrentCommandChanged { task_id, .. }
            | Event::TaskAutopilotChanged { task_id, .. }
            | Event::TaskArchived { task_id }
            | Event::TaskAutoProgressObserved { task_id, .. }
            | Event::TaskReturnReported { task_id, .. }
            | Event::PaneCreated { task_id, .. }
            | Event::PaneUuidBackfilled { task_id, .. }
            | Event::PaneClosed { task_id }
            | Event::TaskMessageAppended { task_id, .. }
            | Event::TaskMessageStatusChanged { task_id, .. } => Some(task_id),
            _ => None,
        }
    }

    /// Human-readable one-line summary, for the `tracing::debug!` line
    /// `EngineContext::emit` logs after each event commits.
    pub fn log_summary(&self) -> String {
        match self {
            Event::TaskCreated { task_id, title, .. } => {
                format!("task {task_id} created: {title:?}")
            }
            Event::TaskStatusChanged { task_id, status, .. } => {
                format!("task {task_id} -> {status}")
            }
            Event::RunStatusChanged { run_id, status } => {
                format!("run {run_id} -> {status}")
            }
            Event::PaneCreated {
                task_id,
                pane_target,
                ..
            } => format!("pane {pane_target} bound to task {task_id}"),
            other => other.topic().to_string(),
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
