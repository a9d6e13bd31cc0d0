// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ojp task` — create, derive, and update tasks.

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::output::{print_json, OutputFormat};

#[derive(Args)]
pub struct TaskArgs {
    #[command(subcommand)]
    pub command: TaskCommand,
}

#[derive(Subcommand)]
pub enum TaskCommand {
    /// Create a new top-level task under a project
    Create {
        #[arg(long = "project")]
        project_id: String,
        title: String,
    },
    /// Derive a child task from a parent task
    Derive {
        parent_id: String,
        #[arg(long = "project")]
        project_id: String,
        title: String,
        #[arg(long = "role")]
        child_role: Option<String>,
    },
    /// Adopt an already-running pane as a child task
    AdoptPane {
        parent_id: String,
        #[arg(long = "project")]
        project_id: String,
        title: String,
        #[arg(long = "role")]
        child_role: Option<String>,
        #[arg(long = "pane-id")]
        pane_id: String,
        #[arg(long = "pane-target")]
        pane_target: String,
    },
    /// Set a task's status
    Status {
        task_id: String,
        /// e.g. todo, in-progress, done, canceled
        status: String,
    },
    /// Mark a task checked or unchecked
    Check {
        task_id: String,
        #[arg(long)]
        off: bool,
    },
    /// Rename a task
    Title { task_id: String, title: String },
    /// Replace a task's description
    Description {
        task_id: String,
        description: String,
    },
    /// Raise or clear a flag on a task
    Flag {
        task_id: String,
        /// e.g. none, needs-input, error
        flag: String,
        #[arg(long = "desc", default_value = "")]
        flag_desc: String,
    },
    /// Mark a task's flag as read (or unread)
    FlagReaded {
        task_id: String,
        #[arg(long)]
        unread: bool,
    },
    /// Enable or disable autopilot for a task
    Autopilot {
        task_id: String,
        #[arg(long)]
        off: bool,
    },
    /// Post a message onto a task's conversation
    Message {
        task_id: String,
        content: String,
        #[arg(long, default_value = "user")]
        source: String,
        #[arg(long, default_value = "none")]
        flag: String,
        #[arg(long = "flag-desc", default_value = "")]
        flag_desc: String,
    },
}

pub async fn handle(command: TaskCommand, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::for_action().await?;
    let value = match command {
        TaskCommand::Create { project_id, title } => {
            client.create_task(&project_id, &title).await?
        }
        TaskCommand::Derive {
            parent_id,
            project_id,
            title,
            child_role,
        } => {
            client
                .derive_task(&parent_id, &project_id, &title, child_role.as_deref())
                .await?
        }
        TaskCommand::AdoptPane {
            parent_id,
            project_id,
            title,
            child_role,
            pane_id,
            pane_target,
        } => {
            client
                .adopt_pane(
                    &parent_id,
                    &project_id,
                    &title,
                    child_role.as_deref(),
                    &pane_id,
                    &pane_target,
                )
                .await?
        }
        TaskCommand::Status { task_id, status } => client.set_status(&task_id, &status).await?,
        TaskCommand::Check { task_id, off } => client.set_checked(&task_id, !off).await?,
        TaskCommand::Title { task_id, title } => client.set_title(&task_id, &title).await?,
        TaskCommand::Description {
            task_id,
            description,
        } => client.set_description(&task_id, &description).await?,
        TaskCommand::Flag {
            task_id,
            flag,
            flag_desc,
        } => client.set_flag(&task_id, &flag, &flag_desc).await?,
        TaskCommand::FlagReaded { task_id, unread } => {
            client.set_flag_readed(&task_id, !unread).await?
        }
        TaskCommand::Autopilot { task_id, off } => client.set_autopilot(&task_id, !off).await?,
        TaskCommand::Message {
            task_id,
            content,
            source,
            flag,
            flag_desc,
        } => {
            client
                .post_message(&task_id, &source, &content, &flag, &flag_desc)
                .await?
        }
    };

    match format {
        OutputFormat::Json => print_json(&value)?,
        OutputFormat::Text => print_json(&value)?,
    }
    Ok(())
}
