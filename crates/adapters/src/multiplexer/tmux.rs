// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! tmux-backed `MultiplexerAdapter`.
//!
//! Every operation shells out via `tokio::process::Command`; non-zero exit
//! maps to a typed `MultiplexerError`, and stderr is logged on both the
//! success and failure paths since tmux frequently warns on stderr even
//! when the requested operation otherwise succeeded.

use super::{CreatedPane, MultiplexerAdapter, MultiplexerError};
use crate::subprocess::{
    run_with_timeout, MULTIPLEXER_COMMAND_TIMEOUT, MULTIPLEXER_READ_TIMEOUT,
    SHELL_READY_POLL_INTERVAL, SHELL_READY_POLL_TIMEOUT,
};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tokio::time::Instant;

/// Format string passed to `-P -F` on pane-creating commands: pane id,
/// then the addressable `session:window.pane` target.
const PANE_FORMAT: &str = "#{pane_id} #{session_name}:#{window_index}.#{pane_index}";

#[derive(Clone, Default)]
pub struct TmuxMultiplexer {
    /// `-S <path>`-style socket override, forwarded from the `TMUX_SOCKET`
    /// process env.
    socket: Option<String>,
}

impl TmuxMultiplexer {
    pub fn new() -> Self {
        Self { socket: None }
    }

    /// Build a `TmuxMultiplexer` that talks to a non-default tmux socket.
    pub fn with_socket(socket: impl Into<String>) -> Self {
        Self { socket: Some(socket.into()) }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new("tmux");
        if let Some(socket) = &self.socket {
            cmd.args(["-S", socket]);
        }
        cmd
    }

    fn session_name(name: &str) -> String {
        format!("ojp-{name}")
    }

    fn login_shell_cmd() -> String {
        let shell = std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string());
        format!("{shell} -l")
    }

    async fn run(&self, cmd: Command, description: &str) -> Result<std::process::Output, MultiplexerError> {
        run_with_timeout(cmd, MULTIPLEXER_COMMAND_TIMEOUT, description)
            .await
            .map_err(MultiplexerError::CommandFailed)
    }

    fn parse_created_pane(output: &std::process::Output) -> Result<CreatedPane, MultiplexerError> {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout.lines().next().unwrap_or("").trim();
        let mut parts = line.splitn(2, ' ');
        let pane_id = parts.next().unwrap_or("").to_string();
        let pane_target = parts.next().unwrap_or("").to_string();
        if pane_id.is_empty() || pane_target.is_empty() {
            return Err(MultiplexerError::CommandFailed(format!(
                "unparsable tmux output: {stdout:?}"
            )));
        }
        Ok(CreatedPane {
            pane_id,
            pane_target,
        })
    }

    async fn new_session(
        &self,
        name: &str,
        cwd: &Path,
        command: Option<&str>,
    ) -> Result<CreatedPane, MultiplexerError> {
        let session = Self::session_name(name);

        let existing = self.command()
            .args(["has-session", "-t", &session])
            .output()
            .await;
        if existing.map(|o| o.status.success()).unwrap_or(false) {
            tracing::warn!(session, "session already exists, killing first");
            let _ = self.command()
                .args(["kill-session", "-t", &session])
                .output()
                .await;
        }

        let mut cmd = self.command();
        cmd.args(["new-session", "-d", "-s", &session, "-c"])
            .arg(cwd)
            .args(["-P", "-F", PANE_FORMAT]);
        if let Some(command) = command {
            cmd.arg(command);
        }

        let output = self.run(cmd, "tmux new-session").await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(session, stderr = %stderr, "tmux new-session failed");
            return Err(MultiplexerError::SpawnFailed(stderr.to_string()));
        }
        if !output.stderr.is_empty() {
            tracing::warn!(session, stderr = %String::from_utf8_lossy(&output.stderr), "tmux new-session stderr (non-fatal)");
        }
        Self::parse_created_pane(&output)
    }

    async fn split_or_new_window(
        &self,
        target: &str,
        cwd: &Path,
        command: Option<&str>,
        new_window: bool,
    ) -> Result<CreatedPane, MultiplexerError> {
        let mut cmd = self.command();
        cmd.arg(if new_window { "new-window" } else { "split-window" })
            .args(["-t", target, "-c"])
            .arg(cwd)
            .args(["-P", "-F", PANE_FORMAT]);
        if let Some(command) = command {
            cmd.arg(command);
        }

        let output = self.run(cmd, "tmux split/new-window").await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(target, stderr = %stderr, "tmux pane create failed");
            return Err(MultiplexerError::SpawnFailed(stderr.to_string()));
        }
        Self::parse_created_pane(&output)
    }
}

#[async_trait]
impl MultiplexerAdapter for TmuxMultiplexer {
    async fn create_root_pane_in_dir(
        &self,
        name: &str,
        cwd: &Path,
    ) -> Result<CreatedPane, MultiplexerError> {
        self.new_session(name, cwd, None).await
    }

    async fn create_root_pane_in_dir_login_shell(
        &self,
        name: &str,
        cwd: &Path,
    ) -> Result<CreatedPane, MultiplexerError> {
        let command = Self::login_shell_cmd();
        self.new_session(name, cwd, Some(&command)).await
    }

    async fn create_sibling_pane_in_dir(
        &self,
        target: &str,
        cwd: &Path,
    ) -> Result<CreatedPane, MultiplexerError> {
        self.split_or_new_window(target, cwd, None, false).await
    }

    async fn create_sibling_pane_in_dir_login_shell(
        &self,
        target: &str,
        cwd: &Path,
    ) -> Result<CreatedPane, MultiplexerError> {
        let command = Self::login_shell_cmd();
        self.split_or_new_window(target, cwd, Some(&command), false)
            .await
    }

    async fn create_child_pane_in_dir(
        &self,
        target: &str,
        cwd: &Path,
    ) -> Result<CreatedPane, MultiplexerError> {
        self.split_or_new_window(target, cwd, None, true).await
    }

    async fn close_pane(&self, target: &str) -> Result<(), MultiplexerError> {
        let cmd = {
            let mut cmd = self.command();
            cmd.args(["kill-pane", "-t", target]);
            cmd
        };
        // Best-effort: the pane may already be gone, which is fine.
        let _ = self.run(cmd, "tmux kill-pane").await;
        Ok(())
    }

    async fn capture_history(&self, target: &str, lines: u32) -> Result<String, MultiplexerError> {
        let mut cmd = self.command();
        cmd.args(["capture-pane", "-t", target, "-p", "-S"])
            .arg(format!("-{lines}"));

        let output = self.run(cmd, "tmux capture-pane").await?;
        if !output.status.success() {
            return Err(MultiplexerError::NotFound(target.to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn read_pane_option_value(
        &self,
        target: &str,
        key: &str,
    ) -> Result<Option<String>, MultiplexerError> {
        let deadline = Instant::now() + SHELL_READY_POLL_TIMEOUT;
        loop {
            let mut cmd = self.command();
            cmd.args(["show-options", "-t", target, "-v", key]);
            let output = cmd
                .output()
                .await
                .map_err(|e| MultiplexerError::CommandFailed(e.to_string()))?;
            if output.status.success() {
                let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !value.is_empty() {
                    return Ok(Some(value));
                }
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(SHELL_READY_POLL_INTERVAL).await;
        }
    }

    async fn current_command(&self, target: &str) -> String {
        let mut cmd = self.command();
        cmd.args(["display-message", "-t", target, "-p", "#{pane_current_command}"]);
        match run_with_timeout(cmd, MULTIPLEXER_READ_TIMEOUT, "tmux current-command").await {
            Ok(output) if output.status.success() => {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            }
            Ok(output) => {
                tracing::warn!(target, stderr = %String::from_utf8_lossy(&output.stderr), "current_command non-zero exit");
                String::new()
            }
            Err(err) => {
                tracing::warn!(target, error = %err, "current_command failed");
                String::new()
            }
        }
    }

    async fn current_path(&self, target: &str) -> String {
        let mut cmd = self.command();
        cmd.args(["display-message", "-t", target, "-p", "#{pane_current_path}"]);
        match run_with_timeout(cmd, MULTIPLEXER_READ_TIMEOUT, "tmux current-path").await {
            Ok(output) if output.status.success() => {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            }
            Ok(output) => {
                tracing::warn!(target, stderr = %String::from_utf8_lossy(&output.stderr), "current_path non-zero exit");
                String::new()
            }
            Err(err) => {
                tracing::warn!(target, error = %err, "current_path failed");
                String::new()
            }
        }
    }

    async fn send_input(&self, target: &str, text: &str) -> Result<(), MultiplexerError> {
        let mut cmd = self.command();
        cmd.args(["send-keys", "-t", target, "-l", "--", text]);
        let output = self.run(cmd, "tmux send-keys").await?;
        if !output.status.success() {
            return Err(MultiplexerError::NotFound(target.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tmux_tests.rs"]
mod tests;
