// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk path conventions for the per-project task/return markdown stubs
//! and the per-user audit log.

use ojp_core::TaskId;
use std::path::{Path, PathBuf};

const APP_DIR: &str = ".oj-paned";

/// `<repo_root>/.oj-paned/tasks/<task_id>.md`
pub fn task_file_path(repo_root: &Path, task_id: &TaskId) -> PathBuf {
    repo_root
        .join(APP_DIR)
        .join("tasks")
        .join(format!("{task_id}.md"))
}

/// `<repo_root>/.oj-paned/returns/<task_id>.return.md`
pub fn return_file_path(repo_root: &Path, task_id: &TaskId) -> PathBuf {
    repo_root
        .join(APP_DIR)
        .join("returns")
        .join(format!("{task_id}.return.md"))
}

/// `<config_dir>/logs/task-completion-automation.log`
pub fn audit_log_path(config_dir: &Path) -> PathBuf {
    config_dir.join("logs").join("task-completion-automation.log")
}

/// `<config_dir>/skills` — system skill index root.
pub fn system_skills_dir(config_dir: &Path) -> PathBuf {
    config_dir.join("skills")
}

/// `<repo_root>/.oj-paned/skills` — project skill index root.
pub fn project_skills_dir(repo_root: &Path) -> PathBuf {
    repo_root.join(APP_DIR).join("skills")
}

/// `<repo_root>/AGENTS-SIDECAR.md` — project-scoped sidecar context doc.
pub fn project_sidecar_doc(repo_root: &Path) -> PathBuf {
    repo_root.join("AGENTS-SIDECAR.md")
}

/// `<config_dir>/AGENTS-SIDECAR.md` — user-scoped fallback.
pub fn system_sidecar_doc(config_dir: &Path) -> PathBuf {
    config_dir.join("AGENTS-SIDECAR.md")
}

/// Write the task markdown stub, creating parent directories as needed.
pub async fn write_task_file(
    repo_root: &Path,
    task_id: &TaskId,
    title: &str,
) -> std::io::Result<()> {
    let path = task_file_path(repo_root, task_id);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let body = format!("# {title}\n\ntask_id: {task_id}\n");
    tokio::fs::write(path, body).await
}

/// Write the return-summary markdown, creating parent directories as needed.
pub async fn write_return_file(
    repo_root: &Path,
    task_id: &TaskId,
    summary: &str,
) -> std::io::Result<()> {
    let path = return_file_path(repo_root, task_id);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, summary).await
}

#[cfg(test)]
#[path = "log_paths_tests.rs"]
mod tests;
