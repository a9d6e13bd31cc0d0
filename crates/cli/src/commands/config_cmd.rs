// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ojp config` — read or update server-level configuration.

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::output::{print_json, OutputFormat};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the daemon's current configuration
    Get,
    /// Update one or more configuration fields
    Set {
        #[arg(long)]
        helper_program: Option<String>,
        #[arg(long)]
        notify_command: Option<String>,
        #[arg(long)]
        helper_openai_base_url: Option<String>,
        #[arg(long)]
        helper_openai_model: Option<String>,
    },
}

pub async fn handle(command: ConfigCommand, format: OutputFormat) -> Result<()> {
    let value = match command {
        ConfigCommand::Get => {
            let client = DaemonClient::for_query()?;
            client.get_config().await?
        }
        ConfigCommand::Set {
            helper_program,
            notify_command,
            helper_openai_base_url,
            helper_openai_model,
        } => {
            let client = DaemonClient::for_action().await?;
            let patch = serde_json::json!({
                "helper_program": helper_program,
                "notify_command": notify_command,
                "helper_openai_base_url": helper_openai_base_url,
                "helper_openai_model": helper_openai_model,
            });
            client.patch_config(patch).await?
        }
    };

    match format {
        OutputFormat::Json => print_json(&value)?,
        OutputFormat::Text => print_json(&value)?,
    }
    Ok(())
}
