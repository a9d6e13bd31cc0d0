// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pane binding and pane runtime snapshot entities.
//!
//! A `PaneBinding` is the (at most one) link between a task and a
//! multiplexer-native pane. `PaneRuntimeSnapshot` is the last-observed
//! viewport/cursor state for a pane, refreshed out-of-band by whatever
//! watches the multiplexer.

use crate::task::TaskId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Server-minted identifier for a pane binding, stable across reopen.
    pub struct PaneUuid;
}

/// The binding of a task to a multiplexer pane. At most one per task; the
/// same `pane_target` must never be bound to two tasks at once (enforced
/// by the pane lifecycle service, not this type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaneBinding {
    pub task_id: TaskId,
    pub pane_uuid: PaneUuid,
    /// Multiplexer-native identifier (e.g. a tmux `%12` pane id).
    pub pane_id: String,
    /// Addressable string form, e.g. `session:window.pane`.
    pub pane_target: String,
    pub shell_ready_required: bool,
    pub shell_ready_acked: bool,
}

/// Coarse readiness of a pane's underlying process, as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeStatus {
    Ready,
    Running,
    Unknown,
}

impl Default for RuntimeStatus {
    fn default() -> Self {
        RuntimeStatus::Unknown
    }
}

/// Last-observed viewport and cursor state for a pane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaneRuntimeSnapshot {
    pub pane_id: String,
    pub runtime_status: RuntimeStatus,
    pub snapshot: String,
    pub snapshot_hash: String,
    pub current_command: String,
    pub has_cursor: bool,
    pub cursor_x: u32,
    pub cursor_y: u32,
    pub updated_at: u64,
}

/// How a new pane relates to the pane it was spawned from: distinguishes
/// the multiplexer adapter call shape and, for `Child`, whether the
/// child-spawn autopilot fallback should be scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneRelation {
    Root,
    Sibling,
    Child,
    RootLoginShell,
    SiblingLoginShell,
}

impl PaneBinding {
    pub fn new(task_id: TaskId, pane_uuid: PaneUuid, pane_id: String, pane_target: String) -> Self {
        Self {
            task_id,
            pane_uuid,
            pane_id,
            pane_target,
            shell_ready_required: false,
            shell_ready_acked: false,
        }
    }
}

#[cfg(test)]
#[path = "pane_tests.rs"]
mod tests;
