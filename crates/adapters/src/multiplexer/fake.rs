// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake multiplexer adapter for testing.
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{CreatedPane, MultiplexerAdapter, MultiplexerError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Recorded multiplexer call, for assertions in caller tests.
#[derive(Debug, Clone)]
pub enum MultiplexerCall {
    CreateRoot { name: String, cwd: PathBuf },
    CreateRootLoginShell { name: String, cwd: PathBuf },
    CreateSibling { target: String, cwd: PathBuf },
    CreateSiblingLoginShell { target: String, cwd: PathBuf },
    CreateChild { target: String, cwd: PathBuf },
    ClosePane { target: String },
    CaptureHistory { target: String, lines: u32 },
    ReadPaneOptionValue { target: String, key: String },
    CurrentCommand { target: String },
    CurrentPath { target: String },
    SendInput { target: String, text: String },
}

#[derive(Default)]
struct FakeState {
    calls: Vec<MultiplexerCall>,
    panes: HashMap<String, String>,
    option_values: HashMap<(String, String), String>,
    current_commands: HashMap<String, String>,
    current_paths: HashMap<String, String>,
    history: HashMap<String, String>,
    next_id: u64,
}

/// In-memory `MultiplexerAdapter` double. Every `create_*` call mints a
/// fresh `pane_id`/`pane_target` pair recorded for later assertions;
/// `read_pane_option_value` and `current_command`/`current_path` return
/// whatever was pre-seeded via the setters, defaulting to `None`/`""`.
#[derive(Clone, Default)]
pub struct FakeMultiplexer {
    inner: Arc<Mutex<FakeState>>,
    counter: Arc<AtomicU64>,
}

impl FakeMultiplexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<MultiplexerCall> {
        self.inner.lock().calls.clone()
    }

    pub fn seed_pane_option(&self, target: &str, key: &str, value: &str) {
        self.inner
            .lock()
            .option_values
            .insert((target.to_string(), key.to_string()), value.to_string());
    }

    pub fn seed_current_command(&self, target: &str, value: &str) {
        self.inner
            .lock()
            .current_commands
            .insert(target.to_string(), value.to_string());
    }

    pub fn seed_current_path(&self, target: &str, value: &str) {
        self.inner
            .lock()
            .current_paths
            .insert(target.to_string(), value.to_string());
    }

    pub fn seed_history(&self, target: &str, value: &str) {
        self.inner
            .lock()
            .history
            .insert(target.to_string(), value.to_string());
    }

    fn mint(&self, basis: &str) -> CreatedPane {
        let id = self.counter.fetch_add(1, Ordering::SeqCst);
        let pane_id = format!("%{id}");
        let pane_target = format!("{basis}:0.{id}");
        self.inner
            .lock()
            .panes
            .insert(pane_target.clone(), pane_id.clone());
        CreatedPane {
            pane_id,
            pane_target,
        }
    }
}

#[async_trait]
impl MultiplexerAdapter for FakeMultiplexer {
    async fn create_root_pane_in_dir(
        &self,
        name: &str,
        cwd: &Path,
    ) -> Result<CreatedPane, MultiplexerError> {
        self.inner.lock().calls.push(MultiplexerCall::CreateRoot {
            name: name.to_string(),
            cwd: cwd.to_path_buf(),
        });
        Ok(self.mint(&format!("fake-{name}")))
    }

    async fn create_root_pane_in_dir_login_shell(
        &self,
        name: &str,
        cwd: &Path,
    ) -> Result<CreatedPane, MultiplexerError> {
        self.inner
            .lock()
            .calls
            .push(MultiplexerCall::CreateRootLoginShell {
                name: name.to_string(),
                cwd: cwd.to_path_buf(),
            });
        Ok(self.mint(&format!("fake-{name}")))
    }

    async fn create_sibling_pane_in_dir(
        &self,
        target: &str,
        cwd: &Path,
    ) -> Result<CreatedPane, MultiplexerError> {
        self.inner.lock().calls.push(MultiplexerCall::CreateSibling {
            target: target.to_string(),
            cwd: cwd.to_path_buf(),
        });
        let session = target.split(':').next().unwrap_or(target);
        Ok(self.mint(session))
    }

    async fn create_sibling_pane_in_dir_login_shell(
        &self,
        target: &str,
        cwd: &Path,
    ) -> Result<CreatedPane, MultiplexerError> {
        self.inner
            .lock()
            .calls
            .push(MultiplexerCall::CreateSiblingLoginShell {
                target: target.to_string(),
                cwd: cwd.to_path_buf(),
            });
        let session = target.split(':').next().unwrap_or(target);
        Ok(self.mint(session))
    }

    async fn create_child_pane_in_dir(
        &self,
        target: &str,
        cwd: &Path,
    ) -> Result<CreatedPane, MultiplexerError> {
        self.inner.lock().calls.push(MultiplexerCall::CreateChild {
            target: target.to_string(),
            cwd: cwd.to_path_buf(),
        });
        let session = target.split(':').next().unwrap_or(target);
        Ok(self.mint(session))
    }

    async fn close_pane(&self, target: &str) -> Result<(), MultiplexerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(MultiplexerCall::ClosePane {
            target: target.to_string(),
        });
        inner.panes.remove(target);
        Ok(())
    }

    async fn capture_history(&self, target: &str, lines: u32) -> Result<String, MultiplexerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(MultiplexerCall::CaptureHistory {
            target: target.to_string(),
            lines,
        });
        Ok(inner.history.get(target).cloned().unwrap_or_default())
    }

    async fn read_pane_option_value(
        &self,
        target: &str,
        key: &str,
    ) -> Result<Option<String>, MultiplexerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(MultiplexerCall::ReadPaneOptionValue {
            target: target.to_string(),
            key: key.to_string(),
        });
        Ok(inner
            .option_values
            .get(&(target.to_string(), key.to_string()))
            .cloned())
    }

    async fn current_command(&self, target: &str) -> String {
        let mut inner = self.inner.lock();
        inner.calls.push(MultiplexerCall::CurrentCommand {
            target: target.to_string(),
        });
        inner.current_commands.get(target).cloned().unwrap_or_default()
    }

    async fn current_path(&self, target: &str) -> String {
        let mut inner = self.inner.lock();
        inner.calls.push(MultiplexerCall::CurrentPath {
            target: target.to_string(),
        });
        inner.current_paths.get(target).cloned().unwrap_or_default()
    }

    async fn send_input(&self, target: &str, text: &str) -> Result<(), MultiplexerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(MultiplexerCall::SendInput {
            target: target.to_string(),
            text: text.to_string(),
        });
        if !inner.panes.contains_key(target) {
            return Err(MultiplexerError::NotFound(target.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
