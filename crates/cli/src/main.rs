// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ojp - control-plane CLI for the local agent-orchestration daemon

mod client;
mod client_lifecycle;
mod color;
mod commands;
mod daemon_process;
mod env;
mod help;
mod output;
mod poll;
mod table;

use output::OutputFormat;

use anyhow::Result;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::{config_cmd, daemon, pane, project, run, system, task};

#[derive(Parser)]
#[command(
    name = "ojp",
    version,
    disable_version_flag = true,
    about = "A local control plane for terminal-multiplexer-backed agent work"
)]
struct Cli {
    /// Output format
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value_t,
        global = true
    )]
    output: OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register and inspect projects
    Project(project::ProjectArgs),
    /// Create, derive, and update tasks
    Task(task::TaskArgs),
    /// Manage the terminal pane backing a task
    Pane(pane::PaneArgs),
    /// Create and bind agent-loop runs
    Run(run::RunArgs),
    /// Read or update server-level configuration
    Config(config_cmd::ConfigArgs),
    /// Inspect daemon capabilities
    System(system::SystemArgs),
    /// Start, stop, and check the background daemon
    Daemon(daemon::DaemonArgs),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run_cli().await {
        let msg = format_error(&e);
        if !msg.is_empty() {
            eprintln!("Error: {}", msg);
        }
        std::process::exit(1);
    }
}

/// Format an anyhow error, deduplicating the chain.
///
/// If the top-level Display already contains the source error text, skip
/// the "Caused by" chain to avoid noisy duplicate output (common when
/// thiserror variants use `#[error("... {0}")]` with `#[from]`). Otherwise
/// render the full chain so context isn't lost.
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();

    let chain_redundant = err
        .chain()
        .skip(1)
        .all(|cause| top.contains(&cause.to_string()));

    if chain_redundant {
        return top;
    }

    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {}: {}", i, cause));
    }
    buf
}

pub fn cli_command() -> clap::Command {
    Cli::command()
        .help_template(help::template())
        .before_help(help::commands())
        .after_help(help::after_help())
        .styles(help::styles())
        .arg(
            clap::Arg::new("version")
                .short('v')
                .short_alias('V')
                .long("version")
                .action(clap::ArgAction::Version)
                .help("Print version"),
        )
}

async fn run_cli() -> Result<()> {
    let matches = match cli_command().try_get_matches() {
        Ok(m) => m,
        Err(e) => {
            if e.kind() == clap::error::ErrorKind::DisplayHelp {
                let args: Vec<String> = std::env::args().collect();
                print_formatted_help(&args);
                return Ok(());
            }
            e.exit();
        }
    };
    let cli = Cli::from_arg_matches(&matches)?;
    let format = cli.output;

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            help::print_help(cli_command());
            return Ok(());
        }
    };

    match command {
        Commands::Project(args) => project::handle(args.command, format).await?,
        Commands::Task(args) => task::handle(args.command, format).await?,
        Commands::Pane(args) => pane::handle(args.command, format).await?,
        Commands::Run(args) => run::handle(args.command, format).await?,
        Commands::Config(args) => config_cmd::handle(args.command, format).await?,
        Commands::System(args) => system::handle(args.command, format).await?,
        Commands::Daemon(args) => daemon::daemon(args, format).await?,
    }

    Ok(())
}

/// Print help with post-hoc colorization, resolving the correct subcommand from args.
fn print_formatted_help(args: &[String]) {
    let cmd = cli_command();

    let non_flags: Vec<&String> = args
        .iter()
        .skip(1)
        .filter(|arg| !arg.starts_with('-'))
        .collect();

    let subcommand_names: Vec<&str> = if non_flags.first().map(|s| s.as_str()) == Some("help") {
        non_flags.iter().skip(1).map(|s| s.as_str()).collect()
    } else {
        non_flags.iter().map(|s| s.as_str()).collect()
    };

    let target_cmd = find_subcommand(cmd, &subcommand_names);
    help::print_help(target_cmd);
}

/// Recursively find a nested subcommand by name path.
pub(crate) fn find_subcommand(mut cmd: clap::Command, names: &[&str]) -> clap::Command {
    for name in names {
        let mut found_sub = None;
        for sub in cmd.get_subcommands() {
            if sub.get_name() == *name || sub.get_all_aliases().any(|a| a == *name) {
                found_sub = Some(sub.get_name().to_string());
                break;
            }
        }
        if let Some(sub_name) = found_sub {
            if let Some(sub) = cmd.find_subcommand_mut(&sub_name) {
                cmd = sub.clone();
            } else {
                break;
            }
        } else {
            break;
        }
    }
    cmd
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
