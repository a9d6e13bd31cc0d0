// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run and run-binding entities: one live execution of a task inside a pane.

use crate::id::IdGen;
use crate::task::TaskId;
use serde::{Deserialize, Serialize};
use std::fmt;

crate::define_id! {
    /// Unique identifier for a run, minted with prefix `r_`.
    pub struct RunId;
}

impl RunId {
    pub fn generate(id_gen: &impl IdGen) -> Self {
        Self::new(format!("r_{}", id_gen.next()))
    }
}

/// Status of a single run of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    NeedsRebind,
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::NeedsRebind => "needs_rebind",
            RunStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// One execution of a task inside a pane. A task accumulates many runs over
/// its lifetime; at most one may be "live" (see [`RunBinding`]) at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub run_id: RunId,
    pub task_id: TaskId,
    pub run_status: RunStatus,
    pub created_at: u64,
}

impl Run {
    pub fn new(run_id: RunId, task_id: TaskId, created_at: u64) -> Self {
        Self {
            run_id,
            task_id,
            run_status: RunStatus::Running,
            created_at,
        }
    }
}

/// Whether a run's pane binding is still current for this process instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingStatus {
    Live,
    Stale,
}

/// The live (or formerly live) binding of a run to a multiplexer pane,
/// stamped with the process-wide `server_instance_id` that created it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunBinding {
    pub run_id: RunId,
    pub server_instance_id: String,
    pub pane_id: String,
    pub pane_target: String,
    pub binding_status: BindingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale_reason: Option<String>,
}

impl RunBinding {
    pub fn new_live(run_id: RunId, server_instance_id: String, pane_id: String, pane_target: String) -> Self {
        Self {
            run_id,
            server_instance_id,
            pane_id,
            pane_target,
            binding_status: BindingStatus::Live,
            stale_reason: None,
        }
    }

    pub fn mark_stale(&mut self, reason: impl Into<String>) {
        self.binding_status = BindingStatus::Stale;
        self.stale_reason = Some(reason.into());
    }
}

/// An append-only entry in a run's outbox, recording an action the engine
/// took on the run's behalf (e.g. auto-completing it) distinct from the
/// run's own status transitions. Used to make repeated idempotent triggers
/// on an already-completed run countable without double-counting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvent {
    pub run_id: RunId,
    pub kind: String,
    pub at: u64,
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
