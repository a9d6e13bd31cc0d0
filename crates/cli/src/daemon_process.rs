// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon process management utilities.
//!
//! Functions for starting, stopping, and probing the `ojpd` background
//! process. A Unix-socket probe is replaced here by an HTTP health check
//! against `ojp-daemon`'s `/api/v1/system/capabilities` endpoint, since
//! this control plane serves JSON over TCP rather than a local socket.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

use crate::client::ClientError;

/// Start the daemon in the background, returning the child process handle.
pub fn start_daemon_background() -> Result<std::process::Child, ClientError> {
    let ojpd_path = find_ojpd_binary()?;

    Command::new(&ojpd_path)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map_err(|e| ClientError::DaemonStartFailed(e.to_string()))
}

/// Wait for a process to exit.
pub async fn wait_for_exit(pid: u32, timeout: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if !process_exists(pid) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

/// Find the `ojpd` binary for a foreground `daemon start --foreground`.
pub fn find_ojpd_binary_for_foreground() -> Result<PathBuf, ClientError> {
    find_ojpd_binary()
}

/// Find the `ojpd` binary: `OJP_DAEMON_BINARY` env > sibling of a debug
/// build under `target/debug` > sibling of the current executable > `$PATH`.
fn find_ojpd_binary() -> Result<PathBuf, ClientError> {
    if let Some(path) = crate::env::daemon_binary() {
        return Ok(PathBuf::from(path));
    }

    let current_exe = std::env::current_exe().ok();

    let is_debug_build = current_exe
        .as_ref()
        .and_then(|p| p.to_str())
        .map(|s| s.contains("target/debug"))
        .unwrap_or(false);

    if is_debug_build {
        if let Some(manifest_dir) = crate::env::cargo_manifest_dir() {
            let dev_path = PathBuf::from(manifest_dir)
                .parent()
                .and_then(|p| p.parent())
                .map(|p| p.join("target/debug/ojpd"));
            if let Some(path) = dev_path {
                if path.exists() {
                    return Ok(path);
                }
            }
        }
    }

    if let Some(ref exe) = current_exe {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("ojpd");
            if sibling.exists() {
                return Ok(sibling);
            }
        }
    }

    Ok(PathBuf::from("ojpd"))
}

/// State directory shared with `ojp-daemon`.
pub fn daemon_dir() -> Result<PathBuf, ClientError> {
    crate::env::state_dir()
}

/// Read the HTTP port the running daemon bound, if a port file exists.
///
/// Written by `ojp-daemon` on startup alongside the pid file; falls back to
/// `OJP_PORT`/the default port when no daemon has ever run in this state
/// directory yet (the daemon we are about to spawn will use that port).
pub fn read_daemon_port() -> Result<u16, ClientError> {
    let dir = daemon_dir()?;
    let port_path = dir.join("daemon.port");
    if let Ok(content) = std::fs::read_to_string(&port_path) {
        if let Ok(port) = content.trim().parse::<u16>() {
            return Ok(port);
        }
    }
    Ok(crate::env::http_port())
}

/// Clean up an orphaned pid file during shutdown.
pub fn cleanup_stale_pid(dir: &Path) {
    let pid_path = dir.join("daemon.pid");
    if pid_path.exists() {
        let _ = std::fs::remove_file(&pid_path);
    }
    let port_path = dir.join("daemon.port");
    if port_path.exists() {
        let _ = std::fs::remove_file(&port_path);
    }
}

/// Get the PID from the daemon pid file, if it exists.
pub fn read_daemon_pid() -> Result<Option<u32>, ClientError> {
    let dir = daemon_dir()?;
    let pid_path = dir.join("daemon.pid");

    if !pid_path.exists() {
        return Ok(None);
    }

    match std::fs::read_to_string(&pid_path) {
        Ok(content) => Ok(content.trim().parse::<u32>().ok()),
        Err(_) => Ok(None),
    }
}

fn kill_signal(signal: &str, pid: u32) -> bool {
    Command::new("kill")
        .args([signal, &pid.to_string()])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Check if a process with the given PID exists.
pub fn process_exists(pid: u32) -> bool {
    kill_signal("-0", pid)
}

/// Force kill a daemon process.
pub fn force_kill_daemon(pid: u32) -> bool {
    kill_signal("-9", pid)
}

/// Read the daemon log, looking for errors logged since the most recent
/// "starting ojpd" line.
pub fn read_startup_error() -> Option<String> {
    let dir = daemon_dir().ok()?;
    let log_path = dir.join("daemon.log");

    let content = std::fs::read_to_string(&log_path).ok()?;
    parse_startup_error(&content)
}

const STARTUP_MARKER: &str = "starting ojpd";

fn parse_startup_error(content: &str) -> Option<String> {
    let start_pos = content.rfind(STARTUP_MARKER)?;
    let startup_log = &content[start_pos..];

    let errors: Vec<&str> = startup_log
        .lines()
        .filter(|line| line.contains("ERROR"))
        .collect();

    if errors.is_empty() {
        None
    } else {
        Some(errors.join("\n"))
    }
}

/// Wrap an error with startup log info if available.
pub fn wrap_with_startup_error(err: ClientError) -> ClientError {
    if matches!(err, ClientError::DaemonStartFailed(_)) {
        return err;
    }

    if let Some(startup_error) = read_startup_error() {
        ClientError::DaemonStartFailed(startup_error)
    } else {
        err
    }
}

/// Probe whether the daemon is accepting HTTP connections on `port`.
pub fn probe_http(port: u16) -> bool {
    std::net::TcpStream::connect(("127.0.0.1", port)).is_ok()
}

/// Remove stale pid/port files when the daemon is not running.
pub fn cleanup_stale_daemon_files() -> Result<(), ClientError> {
    let dir = daemon_dir()?;
    if let Ok(Some(pid)) = read_daemon_pid() {
        if !process_exists(pid) {
            cleanup_stale_pid(&dir);
        }
    } else {
        cleanup_stale_pid(&dir);
    }
    Ok(())
}

#[cfg(test)]
#[path = "daemon_process_tests.rs"]
mod tests;
