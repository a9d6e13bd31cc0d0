// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Multiplexer adapter: the thin capability surface over the terminal
//! multiplexer driving every pane the control plane creates or reads from.

mod tmux;

pub use tmux::TmuxMultiplexer;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeMultiplexer, MultiplexerCall};

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Errors from multiplexer operations.
#[derive(Debug, Error)]
pub enum MultiplexerError {
    #[error("pane not found: {0}")]
    NotFound(String),
    #[error("spawn failed: {0}")]
    SpawnFailed(String),
    #[error("command failed: {0}")]
    CommandFailed(String),
}

/// A freshly created pane, as returned by every `create_*` operation.
///
/// `pane_id` is the multiplexer-native identifier (e.g. a tmux `%N` pane
/// id); `pane_target` is the addressable form (`session:window.pane`)
/// stored on the `PaneBinding`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPane {
    pub pane_id: String,
    pub pane_target: String,
}

/// Capability over the external terminal multiplexer. Implementations live
/// outside the core state machine — this is the only contract it depends on.
#[async_trait]
pub trait MultiplexerAdapter: Send + Sync + 'static {
    /// Create a brand new root pane (fresh session) rooted at `cwd`. `name`
    /// is a hint used to build the new session's identifier; callers pass
    /// something derived from the owning task id.
    async fn create_root_pane_in_dir(
        &self,
        name: &str,
        cwd: &Path,
    ) -> Result<CreatedPane, MultiplexerError>;

    /// Same as `create_root_pane_in_dir`, but launches a login shell instead
    /// of the default command. Used by the manual-launch pane flow.
    async fn create_root_pane_in_dir_login_shell(
        &self,
        name: &str,
        cwd: &Path,
    ) -> Result<CreatedPane, MultiplexerError>;

    /// Create a new pane alongside `target` (same window), rooted at `cwd`.
    async fn create_sibling_pane_in_dir(
        &self,
        target: &str,
        cwd: &Path,
    ) -> Result<CreatedPane, MultiplexerError>;

    /// Login-shell variant of `create_sibling_pane_in_dir`.
    async fn create_sibling_pane_in_dir_login_shell(
        &self,
        target: &str,
        cwd: &Path,
    ) -> Result<CreatedPane, MultiplexerError>;

    /// Create a new pane underneath `target` (child window), rooted at `cwd`.
    async fn create_child_pane_in_dir(
        &self,
        target: &str,
        cwd: &Path,
    ) -> Result<CreatedPane, MultiplexerError>;

    /// Best-effort close. Callers must not fail the caller's operation on
    /// error here; the pane may already be gone.
    async fn close_pane(&self, target: &str) -> Result<(), MultiplexerError>;

    /// Trailing `lines` of pane scrollback. Callers are responsible for
    /// clamping `lines` to [200, 10000] before calling.
    async fn capture_history(&self, target: &str, lines: u32) -> Result<String, MultiplexerError>;

    /// Poll a pane option (e.g. `@shell_ready`) until it is set or the
    /// timeout elapses. Returns `None` on timeout, never an error for that
    /// case.
    async fn read_pane_option_value(
        &self,
        target: &str,
        key: &str,
    ) -> Result<Option<String>, MultiplexerError>;

    /// Best-effort foreground command name. Returns an empty string on any
    /// failure or timeout rather than propagating an error.
    async fn current_command(&self, target: &str) -> String;

    /// Best-effort current working directory. Same best-effort contract as
    /// `current_command`.
    async fn current_path(&self, target: &str) -> String;

    /// Write literal characters to a pane. No newline is appended.
    async fn send_input(&self, target: &str, text: &str) -> Result<(), MultiplexerError>;
}
