// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ojp pane` — manage the terminal pane backing a task.

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::output::{print_json, OutputFormat};

#[derive(Args)]
pub struct PaneArgs {
    #[command(subcommand)]
    pub command: PaneCommand,
}

#[derive(Subcommand)]
pub enum PaneCommand {
    /// Open the root pane for a project
    Root {
        #[arg(long = "project")]
        project_id: String,
        title: String,
    },
    /// Open a sibling pane next to a task's pane
    Sibling {
        task_id: String,
        #[arg(long = "project")]
        project_id: String,
        title: String,
    },
    /// Open a pane nested under a task's pane
    Child {
        task_id: String,
        #[arg(long = "project")]
        project_id: String,
        title: String,
    },
    /// Reopen a task's pane if it was closed
    Reopen { task_id: String },
    /// Launch a pane the user started manually and attach it to a task
    ManualLaunch {
        #[arg(long = "project")]
        project_id: String,
        #[arg(long = "target")]
        target_task_id: Option<String>,
        title: String,
    },
    /// Show the pane bound to a task
    Get { task_id: String },
    /// Show a task's pane scrollback
    History {
        task_id: String,
        #[arg(long)]
        lines: Option<u32>,
    },
    /// Report a pane idle (called by an external pane-idle watcher)
    AutoComplete {
        pane_target: String,
        #[arg(long, default_value = "")]
        summary: String,
        #[arg(long = "trigger-source", default_value = "pane-actor")]
        trigger_source: String,
        #[arg(long = "observed-last-active-at", default_value_t = 0)]
        observed_last_active_at: i64,
    },
}

pub async fn handle(command: PaneCommand, format: OutputFormat) -> Result<()> {
    let value = match command {
        PaneCommand::Root { project_id, title } => {
            let client = DaemonClient::for_action().await?;
            client.create_root_pane(&project_id, &title).await?
        }
        PaneCommand::Sibling {
            task_id,
            project_id,
            title,
        } => {
            let client = DaemonClient::for_action().await?;
            client
                .create_sibling_pane(&task_id, &project_id, &title)
                .await?
        }
        PaneCommand::Child {
            task_id,
            project_id,
            title,
        } => {
            let client = DaemonClient::for_action().await?;
            client
                .create_child_pane(&task_id, &project_id, &title)
                .await?
        }
        PaneCommand::Reopen { task_id } => {
            let client = DaemonClient::for_action().await?;
            client.reopen_pane(&task_id).await?
        }
        PaneCommand::ManualLaunch {
            project_id,
            target_task_id,
            title,
        } => {
            let client = DaemonClient::for_action().await?;
            client
                .manual_launch_pane(&project_id, target_task_id.as_deref(), &title)
                .await?
        }
        PaneCommand::Get { task_id } => {
            let client = DaemonClient::for_query()?;
            client.get_task_pane(&task_id).await?
        }
        PaneCommand::History { task_id, lines } => {
            let client = DaemonClient::for_query()?;
            client.pane_history(&task_id, lines).await?
        }
        PaneCommand::AutoComplete {
            pane_target,
            summary,
            trigger_source,
            observed_last_active_at,
        } => {
            let client = DaemonClient::for_signal()?;
            client
                .auto_complete_pane(&pane_target, &summary, &trigger_source, observed_last_active_at)
                .await?
        }
    };

    match format {
        OutputFormat::Json => print_json(&value)?,
        OutputFormat::Text => print_json(&value)?,
    }
    Ok(())
}
