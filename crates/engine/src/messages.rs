// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /tasks/{id}/messages`: routes one of five message
//! sources to the right effect — enqueue a supervisor turn, set the task's
//! out-of-band flag, or write raw input straight to the bound pane. Prompt
//! assembly for the two enqueueing sources reuses the same
//! sidecar/skill/history/screen-state gathering `autopilot::enqueue_completion_action`
//! uses for its `pane-idle` turn.

use crate::context::EngineContext;
use crate::error::EngineError;
use crate::supervisor::SupervisorEvent;
use ojp_core::{CoreError, Task};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// `source` discriminant for a message post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSource {
    UserInput,
    ParentMessage,
    ChildReport,
    TaskSetFlag,
    TtyWriteStdin,
}

impl MessageSource {
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "user_input" => Ok(Self::UserInput),
            "parent_message" => Ok(Self::ParentMessage),
            "child_report" => Ok(Self::ChildReport),
            "task_set_flag" => Ok(Self::TaskSetFlag),
            "tty_write_stdin" => Ok(Self::TtyWriteStdin),
            other => Err(CoreError::InvalidMessageSource(other.to_string())),
        }
    }

    fn supervisor_tag(self) -> &'static str {
        match self {
            Self::UserInput => "user_input",
            Self::ParentMessage => "parent_message",
            Self::ChildReport => "child_report",
            Self::TaskSetFlag | Self::TtyWriteStdin => unreachable!("not a supervisor source"),
        }
    }
}

/// Body accepted by `POST /tasks/{id}/messages`.
#[derive(Debug, Clone, Default)]
pub struct MessageRequest {
    pub content: String,
    /// Only meaningful for `source=task_set_flag`.
    pub flag: String,
    pub flag_desc: String,
}

/// Result of a message post: `enqueued` for the two agent-loop sources,
/// `flag_set` / `stdin_written` for the other two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessagePostOutcome {
    Enqueued,
    FlagSet,
    StdinWritten,
}

fn require_task(ctx: &EngineContext, task_id: &str) -> Result<Task, EngineError> {
    ctx.state
        .lock()
        .get_task(task_id)
        .cloned()
        .ok_or_else(|| EngineError::TaskNotFound(task_id.to_string()))
}

fn pane_target_for_task(ctx: &EngineContext, task_id: &str) -> Result<String, EngineError> {
    ctx.state
        .lock()
        .pane_binding_for_task(task_id)
        .map(|b| b.pane_target.clone())
        .ok_or_else(|| EngineError::PaneBindingNotFound(task_id.to_string()))
}

pub async fn post_message(
    ctx: &Arc<EngineContext>,
    task_id: &str,
    source: MessageSource,
    body: MessageRequest,
) -> Result<MessagePostOutcome, EngineError> {
    let task = require_task(ctx, task_id)?;

    match source {
        MessageSource::TaskSetFlag => {
            crate::tasks::set_flag(ctx, task_id, &body.flag, &body.flag_desc)?;
            Ok(MessagePostOutcome::FlagSet)
        }
        MessageSource::TtyWriteStdin => {
            let pane_target = pane_target_for_task(ctx, task_id)?;
            ctx.multiplexer.send_input(&pane_target, &body.content).await?;
            Ok(MessagePostOutcome::StdinWritten)
        }
        MessageSource::UserInput | MessageSource::ParentMessage | MessageSource::ChildReport => {
            enqueue_turn(ctx, &task, source, &body.content).await?;
            Ok(MessagePostOutcome::Enqueued)
        }
    }
}

async fn enqueue_turn(
    ctx: &Arc<EngineContext>,
    task: &Task,
    source: MessageSource,
    content: &str,
) -> Result<(), EngineError> {
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
    let cwd = match &binding {
        Some(b) => ctx.multiplexer.current_path(&b.pane_target).await,
        None => String::new(),
    };
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
    let event_context = serde_json::json!({"source": source.supervisor_tag()});

    let prompt = crate::prompt::build_user_input_prompt(
        content,
        sidecar_doc.as_deref(),
        &skills,
        &event_context,
        &history,
        &screen_state_json,
    );

    let event = SupervisorEvent {
        task_id: task.task_id.as_str().to_string(),
        project_id: task.project_id.as_str().to_string(),
        source: source.supervisor_tag().to_string(),
        display_content: content.to_string(),
        agent_prompt: prompt,
        trigger_meta: std::collections::HashMap::new(),
        cancel: CancellationToken::new(),
    };
    ctx.supervisor.enqueue(event)
}

#[cfg(test)]
#[path = "messages_tests.rs"]
mod tests;
