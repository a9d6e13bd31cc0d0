// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ojp project` — register a project and inspect its task tree.

use anyhow::Result;
use clap::{Args, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::client::DaemonClient;
use crate::output::{print_json, OutputFormat};
use crate::table::{Column, Table};

#[derive(Args)]
pub struct ProjectArgs {
    #[command(subcommand)]
    pub command: ProjectCommand,
}

#[derive(Subcommand)]
pub enum ProjectCommand {
    /// Register a project so tasks and panes can be created under it
    Register {
        /// Stable project identifier
        #[arg(long = "id")]
        project_id: String,
        /// Repository root the project's panes launch in
        #[arg(long = "repo-root")]
        repo_root: PathBuf,
        /// Human-readable display name (defaults to the project id)
        #[arg(long = "name")]
        display_name: Option<String>,
    },
    /// Show a project's full task tree
    Tree {
        /// Project identifier
        project_id: String,
    },
    /// Archive every completed top-level task in a project
    ArchiveDone {
        /// Project identifier
        project_id: String,
    },
}

pub async fn handle(command: ProjectCommand, format: OutputFormat) -> Result<()> {
    match command {
        ProjectCommand::Register {
            project_id,
            repo_root,
            display_name,
        } => {
            let client = DaemonClient::for_action().await?;
            let project = client
                .register_project(&project_id, &repo_root, display_name.as_deref())
                .await?;
            match format {
                OutputFormat::Json => print_json(&project)?,
                OutputFormat::Text => println!("registered project {project_id}"),
            }
        }
        ProjectCommand::Tree { project_id } => {
            let client = DaemonClient::for_query()?;
            let tree = client.project_tree(&project_id).await?;
            match format {
                OutputFormat::Json => print_json(&tree)?,
                OutputFormat::Text => print_tree(&tree),
            }
        }
        ProjectCommand::ArchiveDone { project_id } => {
            let client = DaemonClient::for_action().await?;
            let result = client.archive_done(&project_id).await?;
            match format {
                OutputFormat::Json => print_json(&result)?,
                OutputFormat::Text => {
                    let archived = result.get("archived").and_then(|v| v.as_u64()).unwrap_or(0);
                    println!("archived {archived} task(s)");
                }
            }
        }
    }
    Ok(())
}

/// Render a project tree (`GET /api/v1/projects/:id/tree`) as an indented
/// table: one row per task, ordered depth-first from its roots, with the
/// title indented two spaces per level so parent/child nesting reads at a
/// glance.
fn print_tree(tree: &serde_json::Value) {
    let Some(nodes) = tree.as_array() else {
        return;
    };

    let mut children_of: HashMap<String, Vec<String>> = HashMap::new();
    let mut roots: Vec<String> = Vec::new();
    let mut by_id: HashMap<String, &serde_json::Value> = HashMap::new();

    for node in nodes {
        let Some(task_id) = node.get("task_id").and_then(|v| v.as_str()) else {
            continue;
        };
        by_id.insert(task_id.to_string(), node);
        match node.get("parent_task_id").and_then(|v| v.as_str()) {
            Some(parent_id) => children_of
                .entry(parent_id.to_string())
                .or_default()
                .push(task_id.to_string()),
            None => roots.push(task_id.to_string()),
        }
    }

    let mut table = Table::new(vec![
        Column::left("TITLE"),
        Column::status("STATUS"),
        Column::left("FLAG"),
        Column::left("TASK_ID").with_max(12),
    ]);

    let mut stack: Vec<(String, usize)> = roots.into_iter().rev().map(|id| (id, 0)).collect();
    while let Some((task_id, depth)) = stack.pop() {
        if let Some(node) = by_id.get(&task_id) {
            let title = node.get("title").and_then(|v| v.as_str()).unwrap_or("");
            let status = node.get("status").and_then(|v| v.as_str()).unwrap_or("");
            let checked = node
                .get("checked")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            let flag = node
                .get("flag")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            let check_mark = if checked { "[x] " } else { "" };
            table.row(vec![
                format!("{}{check_mark}{title}", "  ".repeat(depth)),
                status.to_string(),
                flag,
                task_id.clone(),
            ]);
        }
        if let Some(children) = children_of.get(&task_id) {
            for child_id in children.iter().rev() {
                stack.push((child_id.clone(), depth + 1));
            }
        }
    }

    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    table.render(&mut lock);
}
