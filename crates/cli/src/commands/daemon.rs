// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ojp daemon` — start, stop, and check the background daemon.

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use std::process::Command;

use crate::client::{ClientError, DaemonClient};
use crate::client_lifecycle::daemon_stop;
use crate::daemon_process::{find_ojpd_binary_for_foreground, start_daemon_background};
use crate::output::{print_json, OutputFormat};

#[derive(Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: Option<DaemonCommand>,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start the daemon (foreground or background)
    Start {
        /// Run in the foreground instead of detaching
        #[arg(long)]
        foreground: bool,
    },
    /// Stop the daemon
    Stop,
    /// Check whether the daemon is running and reachable
    Status,
}

pub async fn daemon(args: DaemonArgs, format: OutputFormat) -> Result<()> {
    match args.command {
        Some(DaemonCommand::Start { foreground }) => start(foreground).await,
        Some(DaemonCommand::Stop) => stop(format).await,
        Some(DaemonCommand::Status) => status(format).await,
        None => {
            let cmd = crate::find_subcommand(crate::cli_command(), &["daemon"]);
            crate::help::print_help(cmd);
            Ok(())
        }
    }
}

async fn start(foreground: bool) -> Result<()> {
    if foreground {
        let ojpd_path = find_ojpd_binary_for_foreground()?;
        let status = Command::new(&ojpd_path).status()?;
        if !status.success() {
            return Err(anyhow!("daemon exited with status: {}", status));
        }
        return Ok(());
    }

    if DaemonClient::connect().is_ok() {
        println!("daemon already running");
        return Ok(());
    }

    let child = start_daemon_background()?;
    drop(child);
    println!("daemon starting");
    Ok(())
}

async fn stop(format: OutputFormat) -> Result<()> {
    let stopped = daemon_stop().await?;
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({"stopped": stopped}))?,
        OutputFormat::Text => {
            if stopped {
                println!("daemon stopped");
            } else {
                println!("daemon was not running");
            }
        }
    }
    Ok(())
}

async fn status(format: OutputFormat) -> Result<()> {
    let running = match DaemonClient::connect() {
        Ok(client) => client.capabilities().await.is_ok(),
        Err(ClientError::DaemonNotRunning) => false,
        Err(_) => false,
    };

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({"running": running}))?,
        OutputFormat::Text => {
            if running {
                println!("daemon is running");
            } else {
                println!("daemon is not running");
            }
        }
    }
    Ok(())
}
