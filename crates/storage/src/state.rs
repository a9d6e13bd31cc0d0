// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state from WAL replay.

use ojp_core::{
    BindingStatus, Event, MessageStatus, PMMessage, PMSession, PaneBinding, PaneRuntimeSnapshot,
    PaneUuid, Project, ProjectId, Run, RunBinding, RunEvent, RunId, RunStatus, Task,
    TaskAutoProgressMark, TaskId, TaskMessage, TaskStatus,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Materialized state built by folding [`Event`]s over the WAL.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MaterializedState {
    pub projects: HashMap<String, Project>,
    pub tasks: HashMap<String, Task>,
    /// Keyed by task_id; at most one live binding per task.
    pub pane_bindings: HashMap<String, PaneBinding>,
    /// Keyed by multiplexer-native pane_id.
    pub pane_snapshots: HashMap<String, PaneRuntimeSnapshot>,
    pub runs: HashMap<String, Run>,
    pub run_bindings: HashMap<String, RunBinding>,
    /// Keyed by run_id, append-ordered outbox of actions taken on the run's
    /// behalf (e.g. auto-completion), distinct from `runs`' own status.
    pub run_events: HashMap<String, Vec<RunEvent>>,
    /// Keyed by task_id, append-ordered.
    pub task_messages: HashMap<String, Vec<TaskMessage>>,
    /// Keyed by task_id; last accepted auto-progress observation.
    pub auto_progress_marks: HashMap<String, TaskAutoProgressMark>,
    /// Keyed by project_id; project-scoped PM chat sessions. Store surface
    /// only — see `ojp_core::pm` for why no orchestration lives here.
    pub pm_sessions: HashMap<String, Vec<PMSession>>,
    /// Keyed by pm_session_id, append-ordered.
    pub pm_messages: HashMap<String, Vec<PMMessage>>,
}

impl MaterializedState {
    /// Get a task by id or unique prefix (like git commit hashes).
    pub fn get_task(&self, id: &str) -> Option<&Task> {
        if let Some(task) = self.tasks.get(id) {
            return Some(task);
        }
        let matches: Vec<_> = self.tasks.iter().filter(|(k, _)| k.starts_with(id)).collect();
        if matches.len() == 1 {
            Some(matches[0].1)
        } else {
            None
        }
    }

    /// Get a run by id or unique prefix.
    pub fn get_run(&self, id: &str) -> Option<&Run> {
        if let Some(run) = self.runs.get(id) {
            return Some(run);
        }
        let matches: Vec<_> = self.runs.iter().filter(|(k, _)| k.starts_with(id)).collect();
        if matches.len() == 1 {
            Some(matches[0].1)
        } else {
            None
        }
    }

    /// The pane binding (if any) for a given task.
    pub fn pane_binding_for_task(&self, task_id: &str) -> Option<&PaneBinding> {
        self.pane_bindings.get(task_id)
    }

    /// Find the task currently bound to a given `pane_target`, if any.
    pub fn task_for_pane_target(&self, pane_target: &str) -> Option<&Task> {
        let binding = self
            .pane_bindings
            .values()
            .find(|b| b.pane_target == pane_target)?;
        self.tasks.get(binding.task_id.as_str())
    }

    /// Direct, non-archived children of a task, ordered by insertion.
    pub fn children_of(&self, task_id: &str) -> Vec<&Task> {
        self.tasks
            .values()
            .filter(|t| t.parent_task_id.as_deref() == Some(task_id) && !t.archived)
            .collect()
    }

    /// The currently live run binding for a run, if the binding exists and
    /// is still `Live`.
    pub fn live_binding_for_run(&self, run_id: &str) -> Option<&RunBinding> {
        self.run_bindings
            .get(run_id)
            .filter(|b| b.binding_status == BindingStatus::Live)
    }

    /// Number of outbox entries recorded for a run.
    pub fn count_outbox(&self, run_id: &str) -> usize {
        self.run_events.get(run_id).map(|v| v.len()).unwrap_or(0)
    }

    /// Apply an event to derive state changes.
    ///
    /// Event-sourced: state is derived entirely from the event log. All
    /// handlers here must be idempotent — an event may be applied twice,
    /// once for immediate in-process visibility and once on WAL replay.
    /// Guard inserts with existence checks and status-transition checks on
    /// advance-only fields; use assignment rather than increment/decrement.
    pub fn apply_event(&mut self, event: &Event) {
        match event {
            Event::ProjectRegistered {
                project_id,
                repo_root,
                display_name,
                is_git_repo,
            } => {
                self.projects.entry(project_id.as_str().to_string()).or_insert_with(|| Project {
                    project_id: project_id.clone(),
                    repo_root: repo_root.clone(),
                    display_name: display_name.clone(),
                    is_git_repo: *is_git_repo,
                });
            }

            Event::TaskCreated {
                task_id,
                project_id,
                parent_task_id,
                title,
                at,
            } => {
                if !self.tasks.contains_key(task_id.as_str()) {
                    let task = Task::new(
                        task_id.clone(),
                        ProjectId::new(project_id.clone()),
                        parent_task_id.clone(),
                        title.clone(),
                        *at,
                    );
                    if let Some(parent_id) = parent_task_id {
                        if let Some(parent) = self.tasks.get_mut(parent_id.as_str()) {
                            parent.pending_children_count += 1;
                        }
                    }
                    self.tasks.insert(task_id.as_str().to_string(), task);
                }
            }

            Event::TaskDeleted { task_id } => {
                if let Some(task) = self.tasks.remove(task_id.as_str()) {
                    if let Some(parent_id) = &task.parent_task_id {
                        if let Some(parent) = self.tasks.get_mut(parent_id.as_str()) {
                            parent.pending_children_count =
                                parent.pending_children_count.saturating_sub(1);
                        }
                    }
                }
                self.pane_bindings.remove(task_id.as_str());
                self.task_messages.remove(task_id.as_str());
                self.auto_progress_marks.remove(task_id.as_str());
            }

            Event::TaskStatusChanged { task_id, status, at } => {
                if let Some(task) = self.tasks.get_mut(task_id.as_str()) {
                    let was_terminal = task.is_terminal();
                    task.status = *status;
                    task.last_modified = *at;
                    let now_terminal = task.is_terminal();
                    if was_terminal != now_terminal {
                        if let Some(parent_id) = task.parent_task_id.clone() {
                            if let Some(parent) = self.tasks.get_mut(parent_id.as_str()) {
                                if now_terminal {
                                    parent.pending_children_count =
                                        parent.pending_children_count.saturating_sub(1);
                                } else {
                                    parent.pending_children_count += 1;
                                }
                            }
                        }
                    }
                }
            }

            Event::TaskTitleChanged { task_id, title, at } => {
                if let Some(task) = self.tasks.get_mut(task_id.as_str()) {
                    task.title = title.clone();
                    task.last_modified = *at;
                }
            }

            Event::TaskDescriptionChanged {
                task_id,
                description,
                at,
            } => {
                if let Some(task) = self.tasks.get_mut(task_id.as_str()) {
                    task.description = description.clone();
                    task.last_modified = *at;
                }
            }

            Event::TaskCheckedChanged { task_id, checked, at } => {
                if let Some(task) = self.tasks.get_mut(task_id.as_str()) {
                    task.checked = *checked;
                    task.last_modified = *at;
                }
            }

            Event::TaskFlagUpdated {
                task_id,
                flag,
                flag_desc,
                at,
            } => {
                if let Some(task) = self.tasks.get_mut(task_id.as_str()) {
                    task.flag = *flag;
                    task.flag_desc = flag_desc.clone();
                    // Per the resolved open question (see DESIGN.md): any flag
                    // mutation always resets flag_readed to false.
                    task.flag_readed = false;
                    task.last_modified = *at;
                }
            }

            Event::TaskFlagReadedChanged {
                task_id,
                flag_readed,
                at,
            } => {
                if let Some(task) = self.tasks.get_mut(task_id.as_str()) {
                    task.flag_readed = *flag_readed;
                    task.last_modified = *at;
                }
            }

            Event::TaskCurrentCommandChanged {
                task_id,
                current_command,
                at,
            } => {
                if let Some(task) = self.tasks.get_mut(task_id.as_str()) {
                    task.current_command = current_command.clone();
                    task.last_modified = *at;
                }
            }

            Event::TaskAutopilotChanged { task_id, enabled, at } => {
                if let Some(task) = self.tasks.get_mut(task_id.as_str()) {
                    task.sidecar_mode = if *enabled {
                        ojp_core::SidecarMode::Autopilot
                    } else {
                        ojp_core::SidecarMode::Advisor
                    };
                    task.last_modified = *at;
                }
            }

            Event::TaskArchived { task_id } => {
                if let Some(task) = self.tasks.get_mut(task_id.as_str()) {
                    task.archived = true;
                }
            }

            Event::TaskTreeChanged { .. } => {
                // Notification-only event; the tree is derived on read from
                // `tasks`/`pending_children_count`, nothing to materialize.
            }

            Event::TaskAutoProgressObserved {
                task_id,
                observed_last_active_at,
            } => {
                self.auto_progress_marks.insert(
                    task_id.as_str().to_string(),
                    TaskAutoProgressMark {
                        observed_last_active_at: *observed_last_active_at,
                    },
                );
            }

            Event::TaskReturnReported { task_id, .. } => {
                // Return summaries are written to the return file by the
                // autopilot engine (`log_paths::write_return_file`); the
                // event itself is a durable fact for audit/replay, no
                // MaterializedState field to update beyond what
                // TaskStatusChanged already set.
                let _ = task_id;
            }

            Event::PaneCreated {
                task_id,
                pane_uuid,
                pane_id,
                pane_target,
            } => {
                self.pane_bindings.insert(
                    task_id.as_str().to_string(),
                    PaneBinding::new(
                        task_id.clone(),
                        pane_uuid.clone(),
                        pane_id.clone(),
                        pane_target.clone(),
                    ),
                );
            }

            Event::PaneUuidBackfilled { task_id, pane_uuid } => {
                if let Some(binding) = self.pane_bindings.get_mut(task_id.as_str()) {
                    binding.pane_uuid = pane_uuid.clone();
                }
            }

            Event::PaneClosed { task_id } => {
                self.pane_bindings.remove(task_id.as_str());
            }

            Event::PaneSnapshotUpdated {
                pane_id,
                runtime_status,
                snapshot,
                snapshot_hash,
                current_command,
                has_cursor,
                cursor_x,
                cursor_y,
                updated_at,
            } => {
                let entry = self
                    .pane_snapshots
                    .entry(pane_id.clone())
                    .or_insert_with(|| PaneRuntimeSnapshot {
                        pane_id: pane_id.clone(),
                        runtime_status: *runtime_status,
                        snapshot: String::new(),
                        snapshot_hash: String::new(),
                        current_command: String::new(),
                        has_cursor: false,
                        cursor_x: 0,
                        cursor_y: 0,
                        updated_at: *updated_at,
                    });
                entry.runtime_status = *runtime_status;
                entry.snapshot = snapshot.clone();
                entry.snapshot_hash = snapshot_hash.clone();
                entry.current_command = current_command.clone();
                entry.has_cursor = *has_cursor;
                entry.cursor_x = *cursor_x;
                entry.cursor_y = *cursor_y;
                entry.updated_at = *updated_at;
            }

            Event::RunCreated { run_id, task_id } => {
                if !self.runs.contains_key(run_id.as_str()) {
                    self.runs.insert(
                        run_id.as_str().to_string(),
                        Run::new(run_id.clone(), task_id.clone(), 0),
                    );
                }
            }

            Event::RunStatusChanged { run_id, status } => {
                if let Some(run) = self.runs.get_mut(run_id.as_str()) {
                    run.run_status = *status;
                }
                if *status != RunStatus::Running {
                    if let Some(binding) = self.run_bindings.get_mut(run_id.as_str()) {
                        if binding.binding_status == BindingStatus::Live {
                            binding.mark_stale("run reached a terminal status");
                        }
                    }
                }
            }

            Event::RunBindingUpserted {
                run_id,
                server_instance_id,
                pane_id,
                pane_target,
            } => {
                self.run_bindings.insert(
                    run_id.as_str().to_string(),
                    RunBinding::new_live(
                        run_id.clone(),
                        server_instance_id.clone(),
                        pane_id.clone(),
                        pane_target.clone(),
                    ),
                );
            }

            Event::RunBindingMarkedStale { run_id, reason } => {
                if let Some(binding) = self.run_bindings.get_mut(run_id.as_str()) {
                    if binding.binding_status == BindingStatus::Live {
                        binding.mark_stale(reason.clone());
                    }
                }
            }

            Event::RunEventAppended { run_id, kind, at } => {
                let events = self.run_events.entry(run_id.as_str().to_string()).or_default();
                events.push(RunEvent {
                    run_id: run_id.clone(),
                    kind: kind.clone(),
                    at: *at,
                });
            }

            Event::TaskMessageAppended {
                task_id,
                seq,
                role,
                content,
                created_at,
            } => {
                let messages = self.task_messages.entry(task_id.as_str().to_string()).or_default();
                // Idempotency: skip if this seq was already appended.
                if !messages.iter().any(|m| m.seq == *seq) {
                    messages.push(TaskMessage {
                        task_id: task_id.clone(),
                        seq: *seq,
                        role: *role,
                        content: content.clone(),
                        status: MessageStatus::Running,
                        error: None,
                        created_at: *created_at,
                    });
                }
            }

            Event::TaskMessageStatusChanged {
                task_id,
                seq,
                status,
                content,
                error,
            } => {
                if let Some(messages) = self.task_messages.get_mut(task_id.as_str()) {
                    if let Some(m) = messages.iter_mut().find(|m| m.seq == *seq) {
                        m.status = *status;
                        if let Some(content) = content {
                            m.content = content.clone();
                        }
                        m.error = error.clone();
                    }
                }
            }

            Event::PmSessionCreated {
                pm_session_id,
                project_id,
                title,
                at,
            } => {
                let sessions = self.pm_sessions.entry(project_id.clone()).or_default();
                if !sessions.iter().any(|s| s.pm_session_id == *pm_session_id) {
                    sessions.push(PMSession::new(
                        pm_session_id.clone(),
                        ProjectId::new(project_id.clone()),
                        title.clone(),
                        *at,
                    ));
                }
            }

            Event::PmMessageAppended {
                pm_session_id,
                seq,
                role,
                content,
                created_at,
            } => {
                let messages = self
                    .pm_messages
                    .entry(pm_session_id.as_str().to_string())
                    .or_default();
                if !messages.iter().any(|m| m.seq == *seq) {
                    messages.push(PMMessage {
                        pm_session_id: pm_session_id.clone(),
                        seq: *seq,
                        role: *role,
                        content: content.clone(),
                        created_at: *created_at,
                    });
                }
            }

            Event::Custom => {}
        }
    }

    /// All PM sessions registered for a project, insertion order.
    pub fn pm_sessions_for_project(&self, project_id: &str) -> &[PMSession] {
        self.pm_sessions.get(project_id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// All messages in a PM session, append order.
    pub fn pm_messages_for_session(&self, pm_session_id: &str) -> &[PMMessage] {
        self.pm_messages.get(pm_session_id).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
