// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run lifecycle service: create a run, upsert its
//! live pane binding, and resume-check it against the current server
//! instance. Uses the same `EngineContext`-direct-call shape as
//! `tasks.rs`/`panes.rs`; the server-instance staleness check mirrors the
//! one `autopilot.rs` performs inline for `AutoCompleteByPane`'s live-run step.

use crate::context::EngineContext;
use crate::error::EngineError;
use ojp_core::{CoreError, Event, Run, RunId, RunStatus};

fn require_run(ctx: &EngineContext, run_id: &str) -> Result<Run, EngineError> {
    ctx.state
        .lock()
        .get_run(run_id)
        .cloned()
        .ok_or_else(|| EngineError::RunNotFound(run_id.to_string()))
}

/// Create a new run for `task_id`, starting in `running`. Does not touch
/// the task's pane binding; callers that also need a live binding should
/// follow up with [`bind_pane`].
pub fn create_run(ctx: &EngineContext, task_id: &str) -> Result<Run, EngineError> {
    if ctx.state.lock().get_task(task_id).is_none() {
        return Err(EngineError::TaskNotFound(task_id.to_string()));
    }
    let run_id = RunId::new(format!("r_{}", ctx.id_gen.next()));
    ctx.emit(Event::RunCreated {
        run_id: run_id.clone(),
        task_id: ojp_core::TaskId::new(task_id.to_string()),
    })?;
    require_run(ctx, run_id.as_str())
}

/// Resolve the pane target for a `bind-pane` call: request body, then
/// `X-Active-Pane-Target` header, then the task's current pane binding —
/// in that priority order.
pub fn resolve_bind_pane_target(
    ctx: &EngineContext,
    task_id: &str,
    body_pane_target: Option<&str>,
    header_pane_target: Option<&str>,
) -> Result<String, EngineError> {
    if let Some(target) = body_pane_target.filter(|t| !t.trim().is_empty()) {
        return Ok(target.to_string());
    }
    if let Some(target) = header_pane_target.filter(|t| !t.trim().is_empty()) {
        return Ok(target.to_string());
    }
    ctx.state
        .lock()
        .pane_binding_for_task(task_id)
        .map(|b| b.pane_target.clone())
        .ok_or_else(|| EngineError::PaneBindingNotFound(task_id.to_string()))
}

/// Upsert `run_id`'s live binding to `pane_target`, stamped with this
/// process's `server_instance_id` and the pane's multiplexer-native
/// `pane_id` (looked up from the task's pane binding when it matches).
pub fn bind_pane(ctx: &EngineContext, run_id: &str, pane_target: &str) -> Result<Run, EngineError> {
    if pane_target.trim().is_empty() {
        return Err(CoreError::InvalidPaneTarget.into());
    }
    let run = require_run(ctx, run_id)?;
    let pane_id = ctx
        .state
        .lock()
        .pane_binding_for_task(run.task_id.as_str())
        .filter(|b| b.pane_target == pane_target)
        .map(|b| b.pane_id.clone())
        .unwrap_or_default();

    ctx.emit(Event::RunBindingUpserted {
        run_id: run.run_id.clone(),
        server_instance_id: ctx.server_instance_id.clone(),
        pane_id,
        pane_target: pane_target.to_string(),
    })?;
    require_run(ctx, run_id)
}

/// Outcome of a `resume` call, per the server-instance-change invariant.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ResumeOutcome {
    pub run_id: String,
    pub status: &'static str,
}

/// Check `run_id`'s live binding against the current `server_instance_id`.
/// If they diverge (the multiplexer process restarted under a new
/// instance id since this run was bound), mark the binding stale and the
/// run `needs_rebind`; otherwise leave it `running`.
pub fn resume_run(ctx: &EngineContext, run_id: &str) -> Result<ResumeOutcome, EngineError> {
    let run = require_run(ctx, run_id)?;
    let mismatched = ctx
        .state
        .lock()
        .live_binding_for_run(run.run_id.as_str())
        .map(|b| b.server_instance_id != ctx.server_instance_id)
        .unwrap_or(false);

    if !mismatched {
        return Ok(ResumeOutcome {
            run_id: run.run_id.as_str().to_string(),
            status: "running",
        });
    }

    ctx.emit(Event::RunBindingMarkedStale {
        run_id: run.run_id.clone(),
        reason: "tmux_restarted".to_string(),
    })?;
    ctx.emit(Event::RunStatusChanged {
        run_id: run.run_id.clone(),
        status: RunStatus::NeedsRebind,
    })?;
    ctx.publish(
        "run.updated",
        "",
        run.task_id.as_str(),
        serde_json::json!({"run_id": run.run_id.as_str(), "status": "needs_rebind"}),
    );

    Ok(ResumeOutcome {
        run_id: run.run_id.as_str().to_string(),
        status: "needs_rebind",
    })
}

#[cfg(test)]
#[path = "runs_tests.rs"]
mod tests;
