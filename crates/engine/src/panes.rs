// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pane lifecycle service: create-root/sibling/child/
//! manual-launch/reopen, adopt-pane, get-task-pane, history capture, and
//! the child-spawn autopilot fallback timer. Every create path shares the
//! same multi-step sequence and rollback discipline as `tasks::create_task`,
//! keeping pane/session setup and its rollback in one place.

use crate::context::EngineContext;
use crate::error::EngineError;
use ojp_core::{
    Event, PaneRelation, PaneRuntimeSnapshot, PaneUuid, RunId, RuntimeStatus, SidecarMode, Task,
    TaskId, TaskRole, TaskStatus,
};
use ojp_core::PaneBinding;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Floor applied to the configured child-spawn fallback delay.
const CHILD_SPAWN_FALLBACK_FLOOR: Duration = Duration::from_millis(1500);

const HISTORY_LINES_MIN: u32 = 200;
const HISTORY_LINES_MAX: u32 = 10_000;
const HISTORY_LINES_DEFAULT: u32 = 2_000;

fn require_task(ctx: &EngineContext, task_id: &str) -> Result<Task, EngineError> {
    ctx.state
        .lock()
        .tasks
        .get(task_id)
        .cloned()
        .ok_or_else(|| EngineError::TaskNotFound(task_id.to_string()))
}

fn project_repo_root(ctx: &EngineContext, project_id: &str) -> Result<PathBuf, EngineError> {
    ctx.state
        .lock()
        .projects
        .get(project_id)
        .map(|p| p.repo_root.clone())
        .ok_or_else(|| EngineError::ProjectNotFound(project_id.to_string()))
}

fn pane_target_for_task(ctx: &EngineContext, task_id: &str) -> Result<String, EngineError> {
    ctx.state
        .lock()
        .pane_binding_for_task(task_id)
        .map(|b| b.pane_target.clone())
        .ok_or_else(|| EngineError::PaneBindingNotFound(task_id.to_string()))
}

/// Steps 3–8 of the common create sequence, shared by every pane-creation
/// entry point below: mint the pane binding, transition the task to
/// `running`, open a live run, best-effort detect `current_command`,
/// publish, and (for child relations under an autopilot parent) schedule
/// the spawn-fallback timer. Steps 2–6 failures roll back the task.
async fn finish_pane_creation(
    ctx: &Arc<EngineContext>,
    task: Task,
    pane_id: String,
    pane_target: String,
    relation: PaneRelation,
) -> Result<Task, EngineError> {
    let task_id = task.task_id.clone();
    let result: Result<(), EngineError> = (async {
        let pane_uuid = PaneUuid::new(format!("pu_{}", ctx.id_gen.next()));
        ctx.emit(Event::PaneCreated {
            task_id: task_id.clone(),
            pane_uuid,
            pane_id: pane_id.clone(),
            pane_target: pane_target.clone(),
        })?;

        let now = ctx.clock.epoch_secs();
        ctx.emit(Event::TaskStatusChanged {
            task_id: task_id.clone(),
            status: TaskStatus::Running,
            at: now,
        })?;

        let run_id = RunId::new(format!("r_{}", ctx.id_gen.next()));
        ctx.emit(Event::RunCreated {
            run_id: run_id.clone(),
            task_id: task_id.clone(),
        })?;
        ctx.emit(Event::RunBindingUpserted {
            run_id,
            server_instance_id: ctx.server_instance_id.clone(),
            pane_id: pane_id.clone(),
            pane_target: pane_target.clone(),
        })?;

        let current_command = ctx.multiplexer.current_command(&pane_target).await;
        if !current_command.is_empty() {
            crate::tasks::set_current_command(ctx, task_id.as_str(), &current_command)?;
        }
        Ok(())
    })
    .await;

    if let Err(err) = result {
        crate::tasks::rollback_task_creation(ctx, task_id.as_str());
        return Err(err);
    }

    let project_id = task.project_id.as_str().to_string();
    ctx.publish(
        "task.status.updated",
        &project_id,
        task_id.as_str(),
        serde_json::json!({"task_id": task_id.as_str()}),
    );
    ctx.publish(
        "pane.created",
        &project_id,
        task_id.as_str(),
        serde_json::json!({"pane_target": pane_target}),
    );
    ctx.publish(
        "task.tree.updated",
        &project_id,
        task_id.as_str(),
        serde_json::json!({}),
    );

    if relation == PaneRelation::Child {
        if let Some(parent_id) = &task.parent_task_id {
            let parent_autopilot = ctx
                .state
                .lock()
                .tasks
                .get(parent_id.as_str())
                .map(|t| t.sidecar_mode == SidecarMode::Autopilot)
                .unwrap_or(false);
            if parent_autopilot {
                schedule_child_spawn_fallback(ctx, task_id.as_str().to_string(), pane_target.clone());
            }
        }
    }

    require_task(ctx, task_id.as_str())
}

/// Create a fresh root pane+task for `project_id`.
pub async fn create_root_pane(
    ctx: &Arc<EngineContext>,
    project_id: &str,
    title: &str,
) -> Result<Task, EngineError> {
    let repo_root = project_repo_root(ctx, project_id)?;
    let task = crate::tasks::create_task(ctx, project_id, None, title).await?;
    let created = match ctx
        .multiplexer
        .create_root_pane_in_dir(task.task_id.as_str(), &repo_root)
        .await
    {
        Ok(created) => created,
        Err(err) => {
            crate::tasks::rollback_task_creation(ctx, task.task_id.as_str());
            return Err(err.into());
        }
    };
    finish_pane_creation(ctx, task, created.pane_id, created.pane_target, PaneRelation::Root).await
}

/// Create a sibling task+pane alongside `target_task_id`'s pane, as a
/// sibling of `target_task_id` in the task tree.
pub async fn create_sibling_pane(
    ctx: &Arc<EngineContext>,
    project_id: &str,
    target_task_id: &str,
    title: &str,
) -> Result<Task, EngineError> {
    let repo_root = project_repo_root(ctx, project_id)?;
    let target = require_task(ctx, target_task_id)?;
    let target_pane_target = pane_target_for_task(ctx, target_task_id)?;

    let task = crate::tasks::create_task(
        ctx,
        project_id,
        target.parent_task_id.as_ref().map(|p| p.as_str()),
        title,
    )
    .await?;
    let created = match ctx
        .multiplexer
        .create_sibling_pane_in_dir(&target_pane_target, &repo_root)
        .await
    {
        Ok(created) => created,
        Err(err) => {
            crate::tasks::rollback_task_creation(ctx, task.task_id.as_str());
            return Err(err.into());
        }
    };
    finish_pane_creation(ctx, task, created.pane_id, created.pane_target, PaneRelation::Sibling).await
}

/// Create a child task+pane underneath `target_task_id`'s pane; the new
/// task is a child of `target_task_id` in the task tree.
pub async fn create_child_pane(
    ctx: &Arc<EngineContext>,
    project_id: &str,
    target_task_id: &str,
    title: &str,
) -> Result<Task, EngineError> {
    let repo_root = project_repo_root(ctx, project_id)?;
    let target_pane_target = pane_target_for_task(ctx, target_task_id)?;

    let task = crate::tasks::create_task(ctx, project_id, Some(target_task_id), title).await?;
    let created = match ctx
        .multiplexer
        .create_child_pane_in_dir(&target_pane_target, &repo_root)
        .await
    {
        Ok(created) => created,
        Err(err) => {
            crate::tasks::rollback_task_creation(ctx, task.task_id.as_str());
            return Err(err.into());
        }
    };
    finish_pane_creation(ctx, task, created.pane_id, created.pane_target, PaneRelation::Child).await
}

/// Create a login-shell sibling pane beside `target_task_id`, falling back
/// to a login-shell root pane if `target_task_id` has no pane binding.
pub async fn manual_launch_pane(
    ctx: &Arc<EngineContext>,
    project_id: &str,
    target_task_id: Option<&str>,
    title: &str,
) -> Result<Task, EngineError> {
    let repo_root = project_repo_root(ctx, project_id)?;
    let existing = target_task_id.and_then(|t| {
        ctx.state
            .lock()
            .pane_binding_for_task(t)
            .map(|b| b.pane_target.clone())
    });

    match existing {
        Some(target_pane_target) => {
            let parent_task_id = target_task_id.and_then(|t| require_task(ctx, t).ok()).and_then(|t| t.parent_task_id);
            let task = crate::tasks::create_task(
                ctx,
                project_id,
                parent_task_id.as_ref().map(|p| p.as_str()),
                title,
            )
            .await?;
            let created = match ctx
                .multiplexer
                .create_sibling_pane_in_dir_login_shell(&target_pane_target, &repo_root)
                .await
            {
                Ok(created) => created,
                Err(err) => {
                    crate::tasks::rollback_task_creation(ctx, task.task_id.as_str());
                    return Err(err.into());
                }
            };
            finish_pane_creation(ctx, task, created.pane_id, created.pane_target, PaneRelation::SiblingLoginShell)
                .await
        }
        None => {
            let task = crate::tasks::create_task(ctx, project_id, None, title).await?;
            let created = match ctx
                .multiplexer
                .create_root_pane_in_dir_login_shell(task.task_id.as_str(), &repo_root)
                .await
            {
                Ok(created) => created,
                Err(err) => {
                    crate::tasks::rollback_task_creation(ctx, task.task_id.as_str());
                    return Err(err.into());
                }
            };
            finish_pane_creation(ctx, task, created.pane_id, created.pane_target, PaneRelation::RootLoginShell)
                .await
        }
    }
}

/// Replace `task_id`'s existing pane binding with a freshly created
/// sibling pane alongside the one being replaced.
pub async fn reopen_pane(ctx: &Arc<EngineContext>, task_id: &str) -> Result<Task, EngineError> {
    let task = require_task(ctx, task_id)?;
    let repo_root = project_repo_root(ctx, task.project_id.as_str())?;
    let old_target = pane_target_for_task(ctx, task_id)?;

    if let Err(err) = ctx.multiplexer.close_pane(&old_target).await {
        tracing::warn!(error = %err, task_id, "reopen: failed to close previous pane");
    }

    let created = ctx
        .multiplexer
        .create_sibling_pane_in_dir(&old_target, &repo_root)
        .await?;
    finish_pane_creation(ctx, task, created.pane_id, created.pane_target, PaneRelation::Sibling).await
}

/// Bind an externally-created pane (`pane_id`/`pane_target` already exist)
/// to a new child task under `parent_task_id`.
#[allow(clippy::too_many_arguments)]
pub async fn adopt_pane(
    ctx: &Arc<EngineContext>,
    project_id: &str,
    parent_task_id: &str,
    title: &str,
    child_role: TaskRole,
    pane_id: &str,
    pane_target: &str,
) -> Result<Task, EngineError> {
    {
        let state = ctx.state.lock();
        if state.task_for_pane_target(pane_target).is_some() {
            return Err(EngineError::PaneAlreadyBound(pane_target.to_string()));
        }
    }

    let task = crate::tasks::derive_task(ctx, project_id, parent_task_id, title, child_role).await?;
    finish_pane_creation(
        ctx,
        task,
        pane_id.to_string(),
        pane_target.to_string(),
        PaneRelation::Child,
    )
    .await
}

/// The pane binding a `get-task-pane` read returns, plus the latest
/// runtime snapshot (or a best-effort `current_command` if none exists).
#[derive(Debug, Clone, serde::Serialize)]
pub struct TaskPaneView {
    pub binding: PaneBinding,
    pub snapshot: Option<PaneRuntimeSnapshot>,
    pub current_command: String,
}

/// Read `task_id`'s pane binding, backfilling a missing `pane_uuid`.
/// Never captures live multiplexer state beyond a best-effort
/// `current_command` fallback when no runtime snapshot exists.
pub async fn get_task_pane(ctx: &EngineContext, task_id: &str) -> Result<TaskPaneView, EngineError> {
    let mut binding = ctx
        .state
        .lock()
        .pane_binding_for_task(task_id)
        .cloned()
        .ok_or_else(|| EngineError::PaneBindingNotFound(task_id.to_string()))?;

    if binding.pane_uuid.as_str().is_empty() {
        let backfilled = PaneUuid::new(format!("pu_{}", ctx.id_gen.next()));
        ctx.emit(Event::PaneUuidBackfilled {
            task_id: TaskId::new(task_id.to_string()),
            pane_uuid: backfilled.clone(),
        })?;
        binding.pane_uuid = backfilled;
    }

    let snapshot = ctx.state.lock().pane_snapshots.get(&binding.pane_id).cloned();
    let current_command = if snapshot.is_none() {
        ctx.multiplexer.current_command(&binding.pane_target).await
    } else {
        String::new()
    };

    Ok(TaskPaneView {
        binding,
        snapshot,
        current_command,
    })
}

/// Batch-upsert pane-runtime records, keyed by multiplexer-
/// native `pane_id`. Called by whatever watches the multiplexer out-of-band
/// (a pane-idle watcher or the UI); carries the raw viewport text and cursor
/// position so the prompt assembler can derive `cursor_hint`/`cursor_semantic`
/// from a live snapshot rather than a hash alone.
pub struct PaneSnapshotInput {
    pub pane_id: String,
    pub runtime_status: RuntimeStatus,
    pub snapshot: String,
    pub current_command: String,
    pub has_cursor: bool,
    pub cursor_x: u32,
    pub cursor_y: u32,
}

pub fn upsert_pane_snapshots(ctx: &EngineContext, updates: Vec<PaneSnapshotInput>) -> Result<usize, EngineError> {
    let now = ctx.clock.epoch_secs();
    let mut applied = 0usize;
    for update in updates {
        use sha2::{Digest, Sha256};
        let hash = format!("{:x}", Sha256::digest(update.snapshot.as_bytes()));
        ctx.emit(Event::PaneSnapshotUpdated {
            pane_id: update.pane_id,
            runtime_status: update.runtime_status,
            snapshot: update.snapshot,
            snapshot_hash: hash,
            current_command: update.current_command,
            has_cursor: update.has_cursor,
            cursor_x: update.cursor_x,
            cursor_y: update.cursor_y,
            updated_at: now,
        })?;
        applied += 1;
    }
    Ok(applied)
}

/// Rendered pane-history capture.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HistoryCapture {
    pub output: String,
    pub frame: HistoryFrame,
    pub cursor: Option<serde_json::Value>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct HistoryFrame {
    pub mode: &'static str,
    pub data: String,
}

fn clamp_history_lines(lines: Option<u32>) -> u32 {
    lines
        .unwrap_or(HISTORY_LINES_DEFAULT)
        .clamp(HISTORY_LINES_MIN, HISTORY_LINES_MAX)
}

/// Live-capture the bound pane's trailing scrollback, clamped to
/// `[200, 10000]` lines regardless of caller input.
pub async fn capture_history(
    ctx: &EngineContext,
    task_id: &str,
    lines: Option<u32>,
) -> Result<HistoryCapture, EngineError> {
    let pane_target = pane_target_for_task(ctx, task_id)?;
    let clamped = clamp_history_lines(lines);
    let output = ctx.multiplexer.capture_history(&pane_target, clamped).await?;
    Ok(HistoryCapture {
        frame: HistoryFrame {
            mode: "reset",
            data: output.clone(),
        },
        output,
        cursor: None,
    })
}

/// Schedule the child-spawn autopilot fallback: after a
/// configurable delay (floored to 1.5s), re-check that the child task is
/// still running on the same pane and the pane is `ready`, then invoke
/// the completion engine with `trigger_source="spawn-fallback"`.
fn schedule_child_spawn_fallback(ctx: &Arc<EngineContext>, child_task_id: String, pane_target: String) {
    let delay = ctx.child_spawn_fallback_delay.max(CHILD_SPAWN_FALLBACK_FLOOR);
    let ctx = Arc::clone(ctx);
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        let ready = {
            let state = ctx.state.lock();
            let task_running = state
                .tasks
                .get(child_task_id.as_str())
                .map(|t| t.status == TaskStatus::Running)
                .unwrap_or(false);
            let binding = state.pane_binding_for_task(&child_task_id);
            let binding_matches = binding.map(|b| b.pane_target == pane_target).unwrap_or(false);
            let pane_ready = binding
                .and_then(|b| state.pane_snapshots.get(&b.pane_id))
                .map(|s| s.runtime_status == RuntimeStatus::Ready)
                .unwrap_or(false);
            task_running && binding_matches && pane_ready
        };

        if !ready {
            return;
        }

        let input = crate::autopilot::AutoCompleteInput {
            pane_target,
            summary: String::new(),
            trigger_source: "spawn-fallback".to_string(),
            observed_last_active_at: 0,
            request_meta: Default::default(),
            caller_path: String::new(),
            caller_active_pane: String::new(),
        };
        if let Err(err) = crate::autopilot::auto_complete_by_pane(&ctx, input).await {
            tracing::warn!(error = %err, task_id = %child_task_id, "child-spawn fallback auto-complete failed");
        }
    });
}

#[cfg(test)]
#[path = "panes_tests.rs"]
mod tests;
