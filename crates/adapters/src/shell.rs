// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Best-effort shell subprocess capability, used by the completion engine's
//! non-pane-idle completion-command path. Kept behind a trait so tests can
//! inject a fake rather than actually spawning a process.

use crate::subprocess::{run_with_timeout, COMPLETION_COMMAND_TIMEOUT};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("spawn failed: {0}")]
    SpawnFailed(String),
    #[error("timed out: {0}")]
    TimedOut(String),
}

/// Runs a configured completion command with caller-supplied environment
/// variables. Unix-only `sh -c` invocation; non-unix shell rules are left
/// unresolved and recorded as an open question in `DESIGN.md`.
#[async_trait]
pub trait ShellRunner: Send + Sync + 'static {
    async fn run_detached(
        &self,
        command_line: &str,
        env: &[(String, String)],
    ) -> Result<(), ShellError>;
}

#[derive(Clone, Default)]
pub struct RealShellRunner;

impl RealShellRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ShellRunner for RealShellRunner {
    async fn run_detached(
        &self,
        command_line: &str,
        env: &[(String, String)],
    ) -> Result<(), ShellError> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command_line);
        for (key, value) in env {
            cmd.env(key, value);
        }

        match run_with_timeout(cmd, COMPLETION_COMMAND_TIMEOUT, "completion command").await {
            Ok(output) => {
                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    tracing::warn!(command_line, stderr = %stderr, "completion command exited non-zero");
                }
                Ok(())
            }
            Err(err) if err.contains("timed out") => Err(ShellError::TimedOut(err)),
            Err(err) => Err(ShellError::SpawnFailed(err)),
        }
    }
}

/// Recorded invocation, for assertions in caller tests.
#[derive(Debug, Clone)]
pub struct ShellCall {
    pub command_line: String,
    pub env: Vec<(String, String)>,
}

#[derive(Clone, Default)]
pub struct FakeShellRunner {
    calls: Arc<Mutex<Vec<ShellCall>>>,
}

impl FakeShellRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ShellCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ShellRunner for FakeShellRunner {
    async fn run_detached(
        &self,
        command_line: &str,
        env: &[(String, String)],
    ) -> Result<(), ShellError> {
        self.calls.lock().push(ShellCall {
            command_line: command_line.to_string(),
            env: env.to_vec(),
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "shell_tests.rs"]
mod tests;
