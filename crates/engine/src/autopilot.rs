// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Autopilot completion engine: `AutoCompleteByPane` decides,
//! from a pane-idle or manual trigger, whether a task's current run should be
//! marked complete, and if so dispatches the right completion action — a
//! supervisor turn for pane-idle triggers, a fire-and-forget shell command
//! for everything else. Follows a "decide, then act" split with a
//! best-effort side-effect discipline for anything downstream of the decision.

use crate::audit::AuditStage;
use crate::context::EngineContext;
use crate::error::EngineError;
use crate::supervisor::SupervisorEvent;
use ojp_core::{CoreError, Event, Run, RunStatus, Task, TaskId, TaskStatus};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

const DEFAULT_SUMMARY: &str = "auto-complete: pane idle and output stable";

/// Request to `AutoCompleteByPane`.
#[derive(Debug, Clone, Default)]
pub struct AutoCompleteInput {
    pub pane_target: String,
    pub summary: String,
    pub trigger_source: String,
    pub observed_last_active_at: i64,
    pub request_meta: HashMap<String, String>,
    pub caller_path: String,
    pub caller_active_pane: String,
}

/// Outcome of an `AutoCompleteByPane` call.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AutoCompleteOutcome {
    pub triggered: bool,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub task_id: String,
    pub run_id: String,
}

impl AutoCompleteOutcome {
    fn skipped(task_id: impl Into<String>, reason: &str) -> Self {
        Self {
            triggered: false,
            status: "skipped",
            reason: Some(reason.to_string()),
            task_id: task_id.into(),
            run_id: String::new(),
        }
    }
}

/// Find the task currently bound to `pane_target`, matching the binding's
/// `pane_target`, multiplexer-native `pane_id`, or `pane_uuid` — whichever
/// the caller happened to pass. Ties broken by highest `last_modified`, then
/// lowest `task_id`.
fn find_task_by_pane(ctx: &EngineContext, pane_target: &str) -> Option<Task> {
    let state = ctx.state.lock();
    let mut candidates: Vec<&Task> = state
        .pane_bindings
        .values()
        .filter(|b| {
            b.pane_target == pane_target || b.pane_id == pane_target || b.pane_uuid.as_str() == pane_target
        })
        .filter_map(|b| state.tasks.get(b.task_id.as_str()))
        .collect();
    candidates.sort_by(|a, b| {
        b.last_modified
            .cmp(&a.last_modified)
            .then_with(|| a.task_id.as_str().cmp(b.task_id.as_str()))
    });
    candidates.into_iter().next().cloned()
}

/// The task's current live run bound to `pane_target`, if one exists.
fn find_live_run_for_task_pane(ctx: &EngineContext, task_id: &str, pane_target: &str) -> Option<Run> {
    let state = ctx.state.lock();
    state
        .runs
        .values()
        .filter(|r| r.task_id.as_str() == task_id && r.run_status == RunStatus::Running)
        .find(|r| {
            state
                .live_binding_for_run(r.run_id.as_str())
                .is_some_and(|b| b.pane_target == pane_target)
        })
        .cloned()
}

/// Idempotently record `observed_last_active_at` as the latest one seen for
/// this task. Returns `false` (duplicate) if it matches the last accepted
/// value, `true` if it was newly recorded.
fn try_mark_task_auto_progress_observed(
    ctx: &EngineContext,
    task_id: &str,
    observed_last_active_at: u64,
) -> Result<bool, EngineError> {
    let already_observed = ctx
        .state
        .lock()
        .auto_progress_marks
        .get(task_id)
        .map(|mark| mark.observed_last_active_at)
        == Some(observed_last_active_at);
    if already_observed {
        return Ok(false);
    }
    ctx.emit(Event::TaskAutoProgressObserved {
        task_id: TaskId::new(task_id.to_string()),
        observed_last_active_at,
    })?;
    Ok(true)
}

/// Decide whether `pane_target`'s task should be marked complete, and if so,
/// dispatch the appropriate completion action. The full multi-step decision
/// procedure: lookup, autopilot gate, dedup gate, live-run check, and dispatch.
pub async fn auto_complete_by_pane(
    ctx: &EngineContext,
    input: AutoCompleteInput,
) -> Result<AutoCompleteOutcome, EngineError> {
    // Step 1: pane_target required.
    if input.pane_target.trim().is_empty() {
        return Err(CoreError::InvalidPaneTarget.into());
    }

    // Step 2: task lookup by pane.
    let Some(task) = find_task_by_pane(ctx, &input.pane_target) else {
        ctx.audit
            .log(AuditStage::Skipped, "", "", Some("no-task-pane-binding"), &input.request_meta);
        return Ok(AutoCompleteOutcome::skipped(String::new(), "no-task-pane-binding"));
    };
    let task_id = task.task_id.as_str().to_string();
    let project_id = task.project_id.as_str().to_string();

    ctx.audit.log(AuditStage::Received, &project_id, &task_id, None, &input.request_meta);

    // Step 3: autopilot gate.
    if input.trigger_source == "pane-actor" && !ctx.get_autopilot(&task_id) {
        ctx.audit
            .log(AuditStage::Skipped, &project_id, &task_id, Some("autopilot-disabled"), &input.request_meta);
        return Ok(AutoCompleteOutcome::skipped(task_id, "autopilot-disabled"));
    }

    // Step 4: dedup gate.
    if input.trigger_source == "pane-actor" {
        if input.observed_last_active_at < 0 {
            return Err(CoreError::InvalidObservedLastActiveAt.into());
        }
        if input.observed_last_active_at > 0 {
            let newly_observed =
                try_mark_task_auto_progress_observed(ctx, &task_id, input.observed_last_active_at as u64)?;
            if !newly_observed {
                ctx.audit.log(
                    AuditStage::Skipped,
                    &project_id,
                    &task_id,
                    Some("duplicate-observed-last-active-at"),
                    &input.request_meta,
                );
                return Ok(AutoCompleteOutcome::skipped(task_id, "duplicate-observed-last-active-at"));
            }
        }
    }

    // Step 5: live-run lookup.
    let live_run = find_live_run_for_task_pane(ctx, &task_id, &input.pane_target);

    // Step 6: server-instance mismatch needs a rebind instead of a completion.
    if let Some(run) = &live_run {
        let mismatched = ctx
            .state
            .lock()
            .live_binding_for_run(run.run_id.as_str())
            .map(|b| b.server_instance_id != ctx.server_instance_id)
            .unwrap_or(false);
        if mismatched {
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
                &project_id,
                &task_id,
                serde_json::json!({"run_id": run.run_id.as_str(), "status": "needs_rebind"}),
            );
            ctx.audit.log(AuditStage::Skipped, &project_id, &task_id, Some("needs_rebind"), &input.request_meta);
            return Ok(AutoCompleteOutcome {
                triggered: false,
                status: "needs_rebind",
                reason: None,
                task_id,
                run_id: run.run_id.as_str().to_string(),
            });
        }
    }

    // Step 6 (live run, matching instance) / step 7 (no live run): complete.
    complete_run(ctx, &task, live_run.as_ref(), &input).await
}

async fn complete_run(
    ctx: &EngineContext,
    task: &Task,
    run: Option<&Run>,
    input: &AutoCompleteInput,
) -> Result<AutoCompleteOutcome, EngineError> {
    let task_id = task.task_id.as_str().to_string();
    let project_id = task.project_id.as_str().to_string();
    let summary = if input.summary.trim().is_empty() {
        DEFAULT_SUMMARY.to_string()
    } else {
        input.summary.clone()
    };
    let now = ctx.clock.epoch_secs();

    if let Some(run) = run {
        ctx.emit(Event::RunStatusChanged {
            run_id: run.run_id.clone(),
            status: RunStatus::Completed,
        })?;
        ctx.emit(Event::RunEventAppended {
            run_id: run.run_id.clone(),
            kind: "auto_complete.pane_idle".to_string(),
            at: now,
        })?;
    }
    ctx.emit(Event::TaskReturnReported {
        task_id: TaskId::new(task_id.clone()),
        run_id: run.map(|r| r.run_id.clone()),
        summary: summary.clone(),
    })?;
    ctx.emit(Event::TaskStatusChanged {
        task_id: TaskId::new(task_id.clone()),
        status: TaskStatus::Completed,
        at: now,
    })?;
    if let Some(parent_id) = task.parent_task_id.clone() {
        crate::tasks::release_parent_if_last_child(ctx, &parent_id);
    }

    let repo_root = ctx.state.lock().projects.get(&project_id).map(|p| p.repo_root.clone());
    if let Some(repo_root) = repo_root {
        if let Err(err) = crate::log_paths::write_return_file(&repo_root, &TaskId::new(task_id.clone()), &summary).await
        {
            tracing::warn!(error = %err, task_id = %task_id, "failed to write return-summary file");
        }
    }

    ctx.publish(
        "task.status.updated",
        &project_id,
        &task_id,
        serde_json::json!({"task_id": task_id}),
    );
    if let Some(run) = run {
        ctx.publish(
            "run.updated",
            &project_id,
            &task_id,
            serde_json::json!({"run_id": run.run_id.as_str(), "status": "completed"}),
        );
    }

    enqueue_completion_action(ctx, task, run.map(|r| r.run_id.as_str().to_string()), &summary, input).await;

    ctx.audit.log(AuditStage::Enqueued, &project_id, &task_id, None, &input.request_meta);

    Ok(AutoCompleteOutcome {
        triggered: true,
        status: "completed",
        reason: None,
        task_id,
        run_id: run.map(|r| r.run_id.as_str().to_string()).unwrap_or_default(),
    })
}

/// Dispatch the completion action: a supervisor turn assembled from a
/// `TTY_OUTPUT_EVENT` prompt for `pane-idle` triggers, or a fire-and-forget
/// completion-command shell invocation for everything else.
async fn enqueue_completion_action(
    ctx: &EngineContext,
    task: &Task,
    run_id: Option<String>,
    summary: &str,
    input: &AutoCompleteInput,
) {
    if input.trigger_source == "pane-idle" {
        let repo_root = ctx
            .state
            .lock()
            .projects
            .get(task.project_id.as_str())
            .map(|p| p.repo_root.clone())
            .unwrap_or_default();
        let sidecar_doc = ctx.prompt_caches.sidecar_doc(&ctx.config_dir, &repo_root);
        let skills = ctx.prompt_caches.skill_index(&ctx.config_dir, &repo_root);
        let history_messages = ctx
            .state
            .lock()
            .task_messages
            .get(task.task_id.as_str())
            .cloned()
            .unwrap_or_default();
        let history = crate::prompt::render_history(&history_messages);

        let binding = ctx.state.lock().pane_binding_for_task(task.task_id.as_str()).cloned();
        let snapshot = binding
            .as_ref()
            .and_then(|b| ctx.state.lock().pane_snapshots.get(&b.pane_id).cloned());
        let cwd = ctx.multiplexer.current_path(&input.pane_target).await;
        let screen_state = match &snapshot {
            Some(snapshot) => crate::prompt::build_terminal_screen_state(snapshot, &cwd),
            None => crate::prompt::TerminalScreenState {
                current_command: task.current_command.clone(),
                viewport_text: String::new(),
                cwd,
                cursor: None,
                cursor_hint: "cursor_unavailable",
                cursor_semantic: "cursor_unavailable",
            },
        };
        let screen_state_json = serde_json::to_value(&screen_state).unwrap_or(serde_json::Value::Null);
        let event_context = serde_json::json!({
            "trigger_source": input.trigger_source,
            "observed_last_active_at": input.observed_last_active_at,
        });
        let prompt = crate::prompt::build_tty_output_prompt(
            task,
            run_id.as_deref(),
            summary,
            sidecar_doc.as_deref(),
            &skills,
            &event_context,
            &history,
            &screen_state_json,
        );
        let display_content = serde_json::json!({
            "meta": {"display_type": "runtime", "source": "tty_output", "event": "tty_output"},
            "summary": summary,
        })
        .to_string();

        let event = SupervisorEvent {
            task_id: task.task_id.as_str().to_string(),
            project_id: task.project_id.as_str().to_string(),
            source: "pane-idle".to_string(),
            display_content,
            agent_prompt: prompt,
            trigger_meta: input.request_meta.clone(),
            cancel: CancellationToken::new(),
        };
        if let Err(err) = ctx.supervisor.enqueue(event) {
            tracing::warn!(error = %err, task_id = %task.task_id, "failed to enqueue completion turn");
        }
        return;
    }

    let Some(command) = ctx.completion_command.clone() else {
        return;
    };
    let env = vec![
        ("TASK_ID".to_string(), task.task_id.as_str().to_string()),
        ("PROJECT_ID".to_string(), task.project_id.as_str().to_string()),
        ("STATUS".to_string(), "completed".to_string()),
        ("SUMMARY".to_string(), summary.to_string()),
        ("FINISHED_AT".to_string(), ctx.clock.epoch_secs().to_string()),
    ];
    let shell = ctx.shell.clone();
    tokio::spawn(async move {
        if let Err(err) = shell.run_detached(&command, &env).await {
            tracing::warn!(error = %err, "completion command failed");
        }
    });
}

#[cfg(test)]
#[path = "autopilot_tests.rs"]
mod tests;
