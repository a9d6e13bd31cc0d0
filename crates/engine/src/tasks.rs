// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task lifecycle service: create/derive, status/check/
//! title/description/flag updates, archive-done, and the project tree
//! listing. Follows a "pure decision, caller executes" split, simplified
//! here to direct `EngineContext` calls since this crate doesn't need a
//! separate effect-interpreter stage (see `DESIGN.md`).

use crate::context::EngineContext;
use crate::error::EngineError;
use ojp_core::{
    validate_description, validate_title, Event, Task, TaskFlag, TaskId, TaskRole, TaskStatus,
};

/// Create a root or child task under `project_id`.
///
/// If `parent_task_id` is set and the parent is not already
/// `waiting_children`, the parent transitions to `waiting_children`
/// (invariant 3). Writes the task markdown stub best-effort; a failure to
/// write the stub does not fail task creation (the stub is a convenience
/// artifact, not part of the durable record).
pub async fn create_task(
    ctx: &EngineContext,
    project_id: &str,
    parent_task_id: Option<&str>,
    title: &str,
) -> Result<Task, EngineError> {
    validate_title(title)?;

    let project = ctx
        .state
        .lock()
        .projects
        .get(project_id)
        .cloned()
        .ok_or_else(|| EngineError::ProjectNotFound(project_id.to_string()))?;

    if let Some(parent_id) = parent_task_id {
        let exists = ctx.state.lock().tasks.contains_key(parent_id);
        if !exists {
            return Err(EngineError::TaskNotFound(parent_id.to_string()));
        }
    }

    let task_id = TaskId::new(format!("t_{}", ctx.id_gen.next()));
    let now = ctx.clock.epoch_secs();

    ctx.emit(Event::TaskCreated {
        task_id: task_id.clone(),
        project_id: project_id.to_string(),
        parent_task_id: parent_task_id.map(TaskId::new),
        title: title.to_string(),
        at: now,
    })?;

    if let Some(parent_id) = parent_task_id {
        maybe_mark_parent_waiting_children(ctx, parent_id, now)?;
    }

    if let Err(err) = crate::log_paths::write_task_file(&project.repo_root, &task_id, title).await {
        tracing::warn!(error = %err, task_id = %task_id, "failed to write task markdown stub");
    }

    ctx.publish(
        "task.tree.updated",
        project_id,
        task_id.as_str(),
        serde_json::json!({"task_id": task_id.as_str()}),
    );

    let task = ctx
        .state
        .lock()
        .tasks
        .get(task_id.as_str())
        .cloned()
        .ok_or_else(|| EngineError::TaskNotFound(task_id.to_string()))?;
    Ok(task)
}

fn maybe_mark_parent_waiting_children(
    ctx: &EngineContext,
    parent_id: &str,
    now: u64,
) -> Result<(), EngineError> {
    let parent_status = ctx.state.lock().tasks.get(parent_id).map(|t| t.status);
    if let Some(status) = parent_status {
        if status != TaskStatus::WaitingChildren {
            ctx.emit(Event::TaskStatusChanged {
                task_id: TaskId::new(parent_id.to_string()),
                status: TaskStatus::WaitingChildren,
                at: now,
            })?;
        }
    }
    Ok(())
}

/// Validate that `child_role` is a legal child role for a parent with
/// `parent_role`, per the planner/executor delegation rules.
pub fn validate_derive_role(parent_role: TaskRole, child_role: TaskRole) -> Result<(), EngineError> {
    match parent_role {
        TaskRole::Planner => {
            if child_role != TaskRole::Executor {
                return Err(EngineError::PlannerOnlySpawnExecutor);
            }
        }
        TaskRole::Executor => {
            return Err(EngineError::ExecutorCannotDelegate);
        }
        TaskRole::Unset => {}
    }
    Ok(())
}

/// Create a child task under `parent_task_id`, enforcing the planner/
/// executor delegation rules.
pub async fn derive_task(
    ctx: &EngineContext,
    project_id: &str,
    parent_task_id: &str,
    title: &str,
    child_role: TaskRole,
) -> Result<Task, EngineError> {
    let parent_role = ctx
        .state
        .lock()
        .tasks
        .get(parent_task_id)
        .map(|t| t.task_role)
        .ok_or_else(|| EngineError::TaskNotFound(parent_task_id.to_string()))?;
    validate_derive_role(parent_role, child_role)?;

    let task = create_task(ctx, project_id, Some(parent_task_id), title).await;
    match task {
        Ok(task) => {
            if child_role != TaskRole::Unset {
                set_role(ctx, task.task_id.as_str(), child_role)?;
            }
            Ok(ctx
                .state
                .lock()
                .tasks
                .get(task.task_id.as_str())
                .cloned()
                .unwrap_or(task))
        }
        Err(err) => Err(err),
    }
}

/// If `parent_id` is `waiting_children` and has no remaining non-terminal
/// children, move it back to `pending` (invariant 3). Must be called on
/// every path that can make a child terminal or disappear: task deletion,
/// status changes, and run completion all reach here.
pub fn release_parent_if_last_child(ctx: &EngineContext, parent_id: &TaskId) {
    let (parent_status, has_non_terminal_children) = {
        let state = ctx.state.lock();
        let status = state.tasks.get(parent_id.as_str()).map(|t| t.status);
        let remaining = state
            .children_of(parent_id.as_str())
            .iter()
            .any(|c| !c.is_terminal());
        (status, remaining)
    };
    if parent_status == Some(TaskStatus::WaitingChildren) && !has_non_terminal_children {
        let now = ctx.clock.epoch_secs();
        if let Err(err) = ctx.emit(Event::TaskStatusChanged {
            task_id: parent_id.clone(),
            status: TaskStatus::Pending,
            at: now,
        }) {
            tracing::warn!(error = %err, parent_id = %parent_id, "failed to restore parent status");
        }
    }
}

/// Undo a partially-created task: delete the row, and if the parent has no
/// other non-terminal children left, move it back from `waiting_children`
/// to `pending`. Rollback failures are logged and swallowed.
pub fn rollback_task_creation(ctx: &EngineContext, task_id: &str) {
    let parent_id = ctx
        .state
        .lock()
        .tasks
        .get(task_id)
        .and_then(|t| t.parent_task_id.clone());

    if let Err(err) = ctx.emit(Event::TaskDeleted {
        task_id: TaskId::new(task_id.to_string()),
    }) {
        tracing::warn!(error = %err, task_id, "rollback: failed to delete task row");
        return;
    }

    if let Some(parent_id) = parent_id {
        release_parent_if_last_child(ctx, &parent_id);
    }
}

fn set_role(ctx: &EngineContext, task_id: &str, role: TaskRole) -> Result<(), EngineError> {
    // `TaskRole` is not itself event-sourced as a dedicated field mutation
    // (it is set once at derive time and never mutated again), so it is
    // stored directly rather than via an `Event`.
    // Safe because no other writer touches a task between its creation and
    // this call within the same `derive_task` invocation.
    let mut state = ctx.state.lock();
    if let Some(task) = state.tasks.get_mut(task_id) {
        task.task_role = role;
    }
    Ok(())
}

pub fn set_status(ctx: &EngineContext, task_id: &str, status: TaskStatus) -> Result<(), EngineError> {
    let parent_id = ctx
        .state
        .lock()
        .tasks
        .get(task_id)
        .ok_or_else(|| EngineError::TaskNotFound(task_id.to_string()))?
        .parent_task_id
        .clone();
    let now = ctx.clock.epoch_secs();
    ctx.emit(Event::TaskStatusChanged {
        task_id: TaskId::new(task_id.to_string()),
        status,
        at: now,
    })?;
    if status.is_terminal() {
        if let Some(parent_id) = parent_id {
            release_parent_if_last_child(ctx, &parent_id);
        }
    }
    publish_task_event(ctx, task_id, "task.status.updated");
    Ok(())
}

pub fn set_checked(ctx: &EngineContext, task_id: &str, checked: bool) -> Result<(), EngineError> {
    require_task(ctx, task_id)?;
    let now = ctx.clock.epoch_secs();
    ctx.emit(Event::TaskCheckedChanged {
        task_id: TaskId::new(task_id.to_string()),
        checked,
        at: now,
    })?;
    publish_task_event(ctx, task_id, "task.status.updated");
    Ok(())
}

pub fn set_title(ctx: &EngineContext, task_id: &str, title: &str) -> Result<(), EngineError> {
    validate_title(title)?;
    require_task(ctx, task_id)?;
    let now = ctx.clock.epoch_secs();
    ctx.emit(Event::TaskTitleChanged {
        task_id: TaskId::new(task_id.to_string()),
        title: title.to_string(),
        at: now,
    })?;
    publish_task_event(ctx, task_id, "task.status.updated");
    Ok(())
}

pub fn set_description(ctx: &EngineContext, task_id: &str, description: &str) -> Result<(), EngineError> {
    validate_description(description)?;
    require_task(ctx, task_id)?;
    let now = ctx.clock.epoch_secs();
    ctx.emit(Event::TaskDescriptionChanged {
        task_id: TaskId::new(task_id.to_string()),
        description: description.to_string(),
        at: now,
    })?;
    publish_task_event(ctx, task_id, "task.status.updated");
    Ok(())
}

/// Set the task's out-of-band flag. Always resets `flag_readed` to false,
/// per the resolved Open Question recorded in `DESIGN.md`.
pub fn set_flag(
    ctx: &EngineContext,
    task_id: &str,
    flag: &str,
    flag_desc: &str,
) -> Result<(), EngineError> {
    let parsed: Option<TaskFlag> = TaskFlag::parse(flag)?;
    let task_title = ctx
        .state
        .lock()
        .tasks
        .get(task_id)
        .map(|t| t.title.clone())
        .ok_or_else(|| EngineError::TaskNotFound(task_id.to_string()))?;
    let now = ctx.clock.epoch_secs();
    ctx.emit(Event::TaskFlagUpdated {
        task_id: TaskId::new(task_id.to_string()),
        flag: parsed,
        flag_desc: flag_desc.to_string(),
        at: now,
    })?;
    publish_task_event(ctx, task_id, "task.flag.updated");
    if matches!(parsed, Some(TaskFlag::Notify) | Some(TaskFlag::Error)) {
        notify_flag(ctx, &task_title, parsed, flag_desc);
    }
    Ok(())
}

/// Best-effort desktop notification for a `notify`/`error` flag. Fire and
/// forget, same discipline as the autopilot engine's completion-command
/// dispatch: a notification failure must never fail the flag update.
fn notify_flag(ctx: &EngineContext, task_title: &str, flag: Option<TaskFlag>, flag_desc: &str) {
    let notify = ctx.notify.clone();
    let title = match flag {
        Some(TaskFlag::Error) => format!("{task_title}: error"),
        _ => format!("{task_title}: notify"),
    };
    let message = flag_desc.to_string();
    tokio::spawn(async move {
        if let Err(err) = notify.notify(&title, &message).await {
            tracing::warn!(error = %err, "desktop notify failed");
        }
    });
}

pub fn set_flag_readed(ctx: &EngineContext, task_id: &str, flag_readed: bool) -> Result<(), EngineError> {
    require_task(ctx, task_id)?;
    let now = ctx.clock.epoch_secs();
    ctx.emit(Event::TaskFlagReadedChanged {
        task_id: TaskId::new(task_id.to_string()),
        flag_readed,
        at: now,
    })?;
    publish_task_event(ctx, task_id, "task.flag.updated");
    Ok(())
}

pub fn set_current_command(ctx: &EngineContext, task_id: &str, current_command: &str) -> Result<(), EngineError> {
    require_task(ctx, task_id)?;
    let now = ctx.clock.epoch_secs();
    ctx.emit(Event::TaskCurrentCommandChanged {
        task_id: TaskId::new(task_id.to_string()),
        current_command: current_command.to_string(),
        at: now,
    })?;
    Ok(())
}

/// Set a task's autopilot flag, updating both the supervisor's resident
/// table and the durable `sidecar_mode` projection.
pub fn set_autopilot(ctx: &EngineContext, task_id: &str, enabled: bool) -> Result<(), EngineError> {
    require_task(ctx, task_id)?;
    ctx.set_autopilot(task_id, enabled);
    let now = ctx.clock.epoch_secs();
    ctx.emit(Event::TaskAutopilotChanged {
        task_id: TaskId::new(task_id.to_string()),
        enabled,
        at: now,
    })?;
    publish_task_event(ctx, task_id, "task.autopilot.updated");
    Ok(())
}

pub fn get_autopilot(ctx: &EngineContext, task_id: &str) -> bool {
    ctx.get_autopilot(task_id)
}

/// Flip `archived=true` on every checked task in a project; returns the
/// number of tasks archived. Idempotent: a second call archives zero.
pub fn archive_done(ctx: &EngineContext, project_id: &str) -> Result<usize, EngineError> {
    let ids: Vec<String> = ctx
        .state
        .lock()
        .tasks
        .values()
        .filter(|t| t.project_id.as_str() == project_id && t.checked && !t.archived)
        .map(|t| t.task_id.as_str().to_string())
        .collect();

    for id in &ids {
        ctx.emit(Event::TaskArchived {
            task_id: TaskId::new(id.clone()),
        })?;
    }
    if !ids.is_empty() {
        ctx.emit(Event::TaskTreeChanged {
            project_id: project_id.to_string(),
        })?;
        ctx.publish(
            "task.tree.updated",
            project_id,
            "",
            serde_json::json!({"archived_count": ids.len()}),
        );
    }
    Ok(ids.len())
}

/// One node of a project's task tree.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TaskTreeNode {
    #[serde(flatten)]
    pub task: Task,
    pub children: Vec<TaskId>,
}

/// Build the full (non-archived) task tree for a project.
///
/// `MaterializedState::tasks` is a `HashMap` and carries no creation order,
/// so node order is approximated by `(last_modified, task_id)` ascending —
/// equal to creation order until a task's first subsequent mutation. See
/// `DESIGN.md`'s Open Question resolution.
pub fn project_tree(ctx: &EngineContext, project_id: &str) -> Vec<TaskTreeNode> {
    let state = ctx.state.lock();
    let mut tasks: Vec<&Task> = state
        .tasks
        .values()
        .filter(|t| t.project_id.as_str() == project_id && !t.archived)
        .collect();
    tasks.sort_by(|a, b| {
        a.last_modified
            .cmp(&b.last_modified)
            .then_with(|| a.task_id.as_str().cmp(b.task_id.as_str()))
    });

    let ids: std::collections::HashSet<&str> = tasks.iter().map(|t| t.task_id.as_str()).collect();
    let mut children_of: std::collections::HashMap<String, Vec<TaskId>> =
        std::collections::HashMap::new();
    for task in &tasks {
        if let Some(parent_id) = &task.parent_task_id {
            if ids.contains(parent_id.as_str()) {
                children_of
                    .entry(parent_id.as_str().to_string())
                    .or_default()
                    .push(task.task_id.clone());
            }
        }
    }

    tasks
        .into_iter()
        .map(|t| TaskTreeNode {
            children: children_of.remove(t.task_id.as_str()).unwrap_or_default(),
            task: t.clone(),
        })
        .collect()
}

fn require_task(ctx: &EngineContext, task_id: &str) -> Result<(), EngineError> {
    if ctx.state.lock().tasks.contains_key(task_id) {
        Ok(())
    } else {
        Err(EngineError::TaskNotFound(task_id.to_string()))
    }
}

fn publish_task_event(ctx: &EngineContext, task_id: &str, topic: &str) {
    let project_id = ctx
        .state
        .lock()
        .tasks
        .get(task_id)
        .map(|t| t.project_id.as_str().to_string())
        .unwrap_or_default();
    ctx.publish(topic, &project_id, task_id, serde_json::json!({"task_id": task_id}));
}

#[cfg(test)]
#[path = "tasks_tests.rs"]
mod tests;
