// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ojp system` — inspect daemon capabilities.

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::output::{print_json, OutputFormat};

#[derive(Args)]
pub struct SystemArgs {
    #[command(subcommand)]
    pub command: SystemCommand,
}

#[derive(Subcommand)]
pub enum SystemCommand {
    /// Show what this daemon build supports (agent loop, multiplexer, notify)
    Capabilities,
}

pub async fn handle(command: SystemCommand, format: OutputFormat) -> Result<()> {
    match command {
        SystemCommand::Capabilities => {
            let client = DaemonClient::for_query()?;
            let value = client.capabilities().await?;
            match format {
                OutputFormat::Json => print_json(&value)?,
                OutputFormat::Text => print_json(&value)?,
            }
        }
    }
    Ok(())
}
