// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management and diagnostic logging for the CLI client.

use std::path::PathBuf;

use crate::client::ClientError;
use crate::daemon_process::{
    cleanup_stale_pid, daemon_dir, force_kill_daemon, process_exists, read_daemon_pid,
    wait_for_exit,
};

/// Stop the daemon (graceful SIGTERM, then SIGKILL on timeout).
///
/// Returns `true` if a daemon was running and has now been stopped, `false`
/// if it wasn't running to begin with. There is no `/api/v1/*` shutdown
/// endpoint — stopping the process is a local lifecycle action, not a
/// control-plane operation.
pub async fn daemon_stop() -> Result<bool, ClientError> {
    let Some(pid) = read_daemon_pid()? else {
        if let Ok(dir) = daemon_dir() {
            cleanup_stale_pid(&dir);
        }
        return Ok(false);
    };

    if !process_exists(pid) {
        if let Ok(dir) = daemon_dir() {
            cleanup_stale_pid(&dir);
        }
        return Ok(false);
    }

    let timeout = super::client::timeout_exit();

    send_sigterm(pid);
    wait_for_exit(pid, timeout).await;

    if process_exists(pid) {
        force_kill_daemon(pid);
        wait_for_exit(pid, timeout).await;
    }

    if let Ok(dir) = daemon_dir() {
        cleanup_stale_pid(&dir);
    }

    Ok(true)
}

fn send_sigterm(pid: u32) {
    let _ = std::process::Command::new("kill")
        .args(["-15", &pid.to_string()])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status();
}

/// Write a diagnostic message to `~/.local/state/ojp/cli.log`.
fn write_cli_log(message: String) {
    use std::io::Write;
    use std::time::SystemTime;

    let log_path = daemon_dir()
        .unwrap_or_else(|_| {
            std::env::var("HOME")
                .map(|h| PathBuf::from(h).join(".local/state/ojp"))
                .unwrap_or_else(|_| PathBuf::from("/tmp"))
        })
        .join("cli.log");

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    if let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let timestamp = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let pid = std::process::id();
        let cwd = std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "(unknown)".to_string());
        let state_dir = std::env::var("OJP_STATE_DIR").unwrap_or_else(|_| "(not set)".to_string());

        let _ = writeln!(
            file,
            "[ts={}] pid={} cwd={} OJP_STATE_DIR={} {}",
            timestamp, pid, cwd, state_dir, message
        );
    }
}

/// Log a connection error for debugging.
///
/// Writes diagnostic info to `~/.local/state/ojp/cli.log` when the CLI
/// fails to reach the daemon over HTTP. Helps debug cases where the CLI
/// runs headless inside a tmux pane and stderr isn't visible.
pub fn log_connection_error(error: &ClientError) {
    write_cli_log(format!("error={error}"));
}
