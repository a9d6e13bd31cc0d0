// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ojp run` — create and bind agent-loop runs.

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::output::{print_json, OutputFormat};

#[derive(Args)]
pub struct RunArgs {
    #[command(subcommand)]
    pub command: RunCommand,
}

#[derive(Subcommand)]
pub enum RunCommand {
    /// Create a new run for a task
    Create { task_id: String },
    /// Bind a run to a pane
    BindPane {
        run_id: String,
        #[arg(long = "pane")]
        pane_target: Option<String>,
    },
    /// Resume a previously bound run
    Resume { run_id: String },
}

pub async fn handle(command: RunCommand, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::for_action().await?;
    let value = match command {
        RunCommand::Create { task_id } => client.create_run(&task_id).await?,
        RunCommand::BindPane {
            run_id,
            pane_target,
        } => client.bind_pane(&run_id, pane_target.as_deref()).await?,
        RunCommand::Resume { run_id } => client.resume_run(&run_id).await?,
    };

    match format {
        OutputFormat::Json => print_json(&value)?,
        OutputFormat::Text => print_json(&value)?,
    }
    Ok(())
}
