// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prompt assembler: builds `USER_INPUT_EVENT` and
//! `TTY_OUTPUT_EVENT` prompt envelopes from task/pane/history/skill/sidecar
//! state. The cache-by-fingerprint discipline follows a "stat before
//! serve" pattern for invalidating path-keyed caches.

use ojp_core::{PaneRuntimeSnapshot, Task, TaskMessage};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const HISTORY_WINDOW: usize = 20;

const KNOWN_SHELLS: &[&str] = &["bash", "zsh", "sh", "fish", "dash", "ksh", "tcsh", "csh"];

/// Terminal screen state heuristics.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CursorState {
    pub row: i64,
    pub col: i64,
    pub visible: bool,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct TerminalScreenState {
    pub current_command: String,
    pub viewport_text: String,
    pub cwd: String,
    pub cursor: Option<CursorState>,
    pub cursor_hint: &'static str,
    pub cursor_semantic: &'static str,
}

/// Derive `cursor_hint`/`cursor_semantic`: absent cursor beats everything
/// else, then a shell-prompt-looking trailing glyph, then a recognized
/// shell name, then the generic fallback.
pub fn derive_cursor_semantics(
    cursor: Option<&CursorState>,
    viewport_text: &str,
    current_command: &str,
) -> (&'static str, &'static str) {
    let Some(cursor) = cursor else {
        return ("cursor_unavailable", "cursor_unavailable");
    };
    if !cursor.visible {
        return ("cursor_unavailable", "cursor_unavailable");
    }
    let trimmed = viewport_text.trim_end_matches(['\n', ' ']);
    if trimmed.ends_with('$') || trimmed.ends_with('#') || trimmed.ends_with('>') {
        return (
            "cursor_at_shell_prompt_ready_for_input",
            "shell_prompt_ready",
        );
    }
    let first_word = current_command.split_whitespace().next().unwrap_or("");
    if KNOWN_SHELLS.iter().any(|shell| first_word == *shell) {
        return ("command_typing", "command_typing");
    }
    ("terminal_program", "terminal_program")
}

pub fn build_terminal_screen_state(
    snapshot: &PaneRuntimeSnapshot,
    cwd: &str,
) -> TerminalScreenState {
    let cursor = if snapshot.has_cursor {
        Some(CursorState {
            row: snapshot.cursor_y as i64,
            col: snapshot.cursor_x as i64,
            visible: true,
        })
    } else {
        None
    };
    let current_command = snapshot.current_command.clone();
    let (cursor_hint, cursor_semantic) =
        derive_cursor_semantics(cursor.as_ref(), &snapshot.snapshot, &current_command);
    TerminalScreenState {
        current_command,
        viewport_text: snapshot.snapshot.clone(),
        cwd: cwd.to_string(),
        cursor,
        cursor_hint,
        cursor_semantic,
    }
}

/// A single skill discovered under a system or project skills directory.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SkillEntry {
    pub name: String,
    pub description: String,
    pub source: &'static str,
}

fn parse_skill_front_matter(text: &str) -> Option<(String, String)> {
    let mut lines = text.lines();
    if lines.next()?.trim() != "---" {
        return None;
    }
    let mut name = None;
    let mut description = None;
    for line in lines {
        let line = line.trim();
        if line == "---" {
            break;
        }
        if let Some(rest) = line.strip_prefix("name:") {
            name = Some(rest.trim().trim_matches('"').to_string());
        } else if let Some(rest) = line.strip_prefix("description:") {
            description = Some(rest.trim().trim_matches('"').to_string());
        }
    }
    Some((name?, description.unwrap_or_default()))
}

fn scan_skills_dir(dir: &Path, source: &'static str) -> Vec<SkillEntry> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut skills = Vec::new();
    for entry in entries.flatten() {
        let skill_md = entry.path().join("SKILL.md");
        let Ok(text) = std::fs::read_to_string(&skill_md) else {
            continue;
        };
        if let Some((name, description)) = parse_skill_front_matter(&text) {
            skills.push(SkillEntry {
                name,
                description,
                source,
            });
        }
    }
    skills
}

/// Scan system then project skill directories; project entries shadow
/// system entries of the same name.
pub fn scan_skill_index(config_dir: &Path, repo_root: &Path) -> Vec<SkillEntry> {
    let system = scan_skills_dir(&crate::log_paths::system_skills_dir(config_dir), "system");
    let project = scan_skills_dir(&crate::log_paths::project_skills_dir(repo_root), "project");

    let mut by_name: HashMap<String, SkillEntry> = HashMap::new();
    for skill in system {
        by_name.insert(skill.name.clone(), skill);
    }
    for skill in project {
        by_name.insert(skill.name.clone(), skill);
    }
    let mut skills: Vec<SkillEntry> = by_name.into_values().collect();
    skills.sort_by(|a, b| a.name.cmp(&b.name));
    skills
}

fn stat_fingerprint(path: &Path) -> Option<(u128, u64)> {
    let meta = std::fs::metadata(path).ok()?;
    let mtime_ns = meta
        .modified()
        .ok()?
        .duration_since(SystemTime::UNIX_EPOCH)
        .ok()?
        .as_nanos();
    Some((mtime_ns, meta.len()))
}

struct SidecarCacheEntry {
    path: PathBuf,
    fingerprint: Option<(u128, u64)>,
    content: Option<String>,
}

struct SkillCacheEntry {
    fingerprint: Vec<(PathBuf, u128, u64)>,
    skills: Vec<SkillEntry>,
}

fn skill_fingerprint(config_dir: &Path, repo_root: &Path) -> Vec<(PathBuf, u128, u64)> {
    let mut paths = Vec::new();
    for dir in [
        crate::log_paths::system_skills_dir(config_dir),
        crate::log_paths::project_skills_dir(repo_root),
    ] {
        if let Ok(entries) = std::fs::read_dir(&dir) {
            for entry in entries.flatten() {
                let skill_md = entry.path().join("SKILL.md");
                if let Some((mtime_ns, len)) = stat_fingerprint(&skill_md) {
                    paths.push((skill_md, mtime_ns, len));
                }
            }
        }
    }
    paths.sort();
    paths
}

/// Process-resident caches backing the prompt assembler: sidecar context
/// document contents (keyed by path, invalidated on mtime/size change) and
/// the skill index (invalidated on a fingerprint of every `SKILL.md`'s
/// (path, mtime_ns, size)).
#[derive(Default)]
pub struct PromptCaches {
    sidecar: Mutex<Option<SidecarCacheEntry>>,
    skills: Mutex<Option<SkillCacheEntry>>,
}

impl PromptCaches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the sidecar context document: project `AGENTS-SIDECAR.md` first,
    /// falling back to the user config one. Returns `None` if neither
    /// exists.
    pub fn sidecar_doc(&self, config_dir: &Path, repo_root: &Path) -> Option<String> {
        let project_path = crate::log_paths::project_sidecar_doc(repo_root);
        let path = if project_path.exists() {
            project_path
        } else {
            crate::log_paths::system_sidecar_doc(config_dir)
        };

        let fingerprint = stat_fingerprint(&path);
        let mut cache = self.sidecar.lock();
        if let Some(entry) = cache.as_ref() {
            if entry.path == path && entry.fingerprint == fingerprint {
                return entry.content.clone();
            }
        }

        let content = std::fs::read_to_string(&path).ok();
        *cache = Some(SidecarCacheEntry {
            path,
            fingerprint,
            content: content.clone(),
        });
        content
    }

    /// Load the skill index, regenerating iff the on-disk fingerprint
    /// changed since the last call.
    pub fn skill_index(&self, config_dir: &Path, repo_root: &Path) -> Vec<SkillEntry> {
        let fingerprint = skill_fingerprint(config_dir, repo_root);
        let mut cache = self.skills.lock();
        if let Some(entry) = cache.as_ref() {
            if entry.fingerprint == fingerprint {
                return entry.skills.clone();
            }
        }
        let skills = scan_skill_index(config_dir, repo_root);
        *cache = Some(SkillCacheEntry {
            fingerprint,
            skills: skills.clone(),
        });
        skills
    }
}

/// Rendered conversation history block plus truncation metadata.
pub struct HistoryBlock {
    pub rendered: String,
    pub included_count: usize,
    pub total_count: usize,
}

/// Render the most recent `HISTORY_WINDOW` messages, most-recent-first.
pub fn render_history(messages: &[TaskMessage]) -> HistoryBlock {
    let total_count = messages.len();
    let mut recent: Vec<&TaskMessage> = messages.iter().rev().take(HISTORY_WINDOW).collect();
    recent.reverse();
    let included_count = recent.len();

    if recent.is_empty() {
        return HistoryBlock {
            rendered: "(none)".to_string(),
            included_count,
            total_count,
        };
    }

    let mut rendered = String::new();
    for message in recent {
        let tag = match message.role {
            ojp_core::MessageRole::User => "user",
            ojp_core::MessageRole::Assistant => "assistant",
        };
        rendered.push_str(&format!("[{tag}] {}\n", message.content));
    }
    HistoryBlock {
        rendered,
        included_count,
        total_count,
    }
}

fn system_context_json(
    sidecar_doc: Option<&str>,
    skills: &[SkillEntry],
    skill_index_error: Option<&str>,
) -> serde_json::Value {
    serde_json::json!({
        "contract_version": "v2",
        "sidecar_context_documents": sidecar_doc.map(|d| vec![d]).unwrap_or_default(),
        "skill_index": skills,
        "skill_index_error": skill_index_error,
    })
}

/// Assemble a `USER_INPUT_EVENT` prompt: raw user input plus system/event
/// context, conversation history, and terminal screen state.
#[allow(clippy::too_many_arguments)]
pub fn build_user_input_prompt(
    user_input: &str,
    sidecar_doc: Option<&str>,
    skills: &[SkillEntry],
    event_context: &serde_json::Value,
    history: &HistoryBlock,
    screen_state: &serde_json::Value,
) -> String {
    let system_context = system_context_json(sidecar_doc, skills, None);
    format!(
        "=== USER_INPUT_EVENT ===\n\n{user_input}\n\nsystem_context_json:\n{}\n\nevent_context_json:\n{}\n\nconversation_history:\n{}\n\nterminal_screen_state_json:\n{}\n",
        serde_json::to_string_pretty(&system_context).unwrap_or_default(),
        serde_json::to_string_pretty(event_context).unwrap_or_default(),
        history.rendered,
        serde_json::to_string_pretty(screen_state).unwrap_or_default(),
    )
}

/// Assemble a `TTY_OUTPUT_EVENT` prompt for an auto-progress completion
/// turn: identifies the task, carries the completion summary, and pins the
/// agent to the current task via a trailing rules footer.
#[allow(clippy::too_many_arguments)]
pub fn build_tty_output_prompt(
    task: &Task,
    run_id: Option<&str>,
    summary: &str,
    sidecar_doc: Option<&str>,
    skills: &[SkillEntry],
    event_context: &serde_json::Value,
    history: &HistoryBlock,
    screen_state: &serde_json::Value,
) -> String {
    let system_context = system_context_json(sidecar_doc, skills, None);
    format!(
        "=== TTY_OUTPUT_EVENT ===\ntask_id: {}\nrun_id: {}\nname: {}\ndescription: {}\nsummary: {summary}\n\nsystem_context_json:\n{}\n\nevent_context_json:\n{}\n\nconversation_history:\n{}\n\nterminal_screen_state_json:\n{}\n\nRules:\n- Stay scoped to this task; do not act on any other task_id.\n",
        task.task_id,
        run_id.unwrap_or(""),
        task.title,
        task.description,
        serde_json::to_string_pretty(&system_context).unwrap_or_default(),
        serde_json::to_string_pretty(event_context).unwrap_or_default(),
        history.rendered,
        serde_json::to_string_pretty(screen_state).unwrap_or_default(),
    )
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;
