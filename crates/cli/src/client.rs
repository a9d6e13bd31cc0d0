// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client for CLI commands.
//!
//! Talks to `ojp-daemon`'s `/api/v1/*` control plane over HTTP, in place of
//! a Unix-socket framed `Request`/`Response` protocol — see `DESIGN.md`.
//! Connection lifecycle (auto-start, version-free restart avoidance,
//! startup-error surfacing) generalizes a `DaemonClient` pattern from
//! socket probing to an HTTP health probe.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::client_lifecycle::log_connection_error;
use crate::daemon_process::{
    cleanup_stale_daemon_files, probe_http, read_daemon_port, start_daemon_background,
    wrap_with_startup_error,
};
use crate::env;

fn parse_duration_ms(var_lookup: Option<Duration>, default: Duration) -> Duration {
    var_lookup.unwrap_or(default)
}

/// Timeout for HTTP requests to the daemon.
pub fn timeout_ipc() -> Duration {
    parse_duration_ms(env::timeout_ipc_ms(), Duration::from_secs(5))
}

/// Timeout for waiting for the daemon to start accepting connections.
pub fn timeout_connect() -> Duration {
    parse_duration_ms(env::timeout_connect_ms(), Duration::from_secs(5))
}

/// Timeout for waiting for a killed process to exit.
pub fn timeout_exit() -> Duration {
    parse_duration_ms(env::timeout_exit_ms(), Duration::from_secs(2))
}

/// Polling interval for connection retries.
pub fn poll_interval() -> Duration {
    parse_duration_ms(env::connect_poll_ms(), Duration::from_millis(50))
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon not running")]
    DaemonNotRunning,

    #[error("failed to start daemon: {0}")]
    DaemonStartFailed(String),

    #[error("connection timeout waiting for daemon to start")]
    DaemonStartTimeout,

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("daemon rejected request ({code}): {message}")]
    Rejected { code: String, message: String },

    #[error("unexpected response from daemon")]
    UnexpectedResponse,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not determine state directory")]
    NoStateDir,
}

#[derive(Debug, serde::Deserialize)]
struct OkEnvelope {
    data: Value,
}

#[derive(Debug, serde::Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// HTTP client for `ojp-daemon`'s control plane.
pub struct DaemonClient {
    base_url: String,
    http: reqwest::Client,
}

impl DaemonClient {
    /// For action commands: auto-start the daemon if it isn't running.
    ///
    /// Action commands mutate state and are user-initiated (task create,
    /// pane spawn, run bind, etc.).
    pub async fn for_action() -> Result<Self, ClientError> {
        Self::connect_or_start_once().await
    }

    /// For query commands: connect only, never auto-start.
    ///
    /// If nothing is running there is nothing useful to read.
    pub fn for_query() -> Result<Self, ClientError> {
        Self::connect()
    }

    /// For signal commands: connect only, never auto-start.
    ///
    /// Semantic alias for [`for_query`](Self::for_query) — signals
    /// (autopilot-driven messages) come from agents and should never
    /// trigger a daemon restart mid-session.
    pub fn for_signal() -> Result<Self, ClientError> {
        Self::connect()
    }

    /// At most one auto-start attempt per process: a one-restart-per-process
    /// guard, generalized from a version-mismatch restart to a
    /// not-running start.
    async fn connect_or_start_once() -> Result<Self, ClientError> {
        static STARTED: AtomicBool = AtomicBool::new(false);

        if STARTED.load(Ordering::SeqCst) {
            return Self::connect();
        }

        match Self::connect() {
            Ok(client) => Ok(client),
            Err(ClientError::DaemonNotRunning) => {
                STARTED.store(true, Ordering::SeqCst);
                cleanup_stale_daemon_files()?;
                let child = start_daemon_background()?;
                Self::connect_with_retry(timeout_connect(), child).await
            }
            Err(e) => Err(wrap_with_startup_error(e)),
        }
    }

    /// Connect to an existing daemon (no auto-start).
    pub fn connect() -> Result<Self, ClientError> {
        let port = read_daemon_port()?;
        if !probe_http(port) {
            let err = ClientError::DaemonNotRunning;
            log_connection_error(&err);
            return Err(err);
        }
        Ok(Self {
            base_url: format!("http://127.0.0.1:{port}"),
            http: reqwest::Client::new(),
        })
    }

    async fn connect_with_retry(
        timeout: Duration,
        mut child: std::process::Child,
    ) -> Result<Self, ClientError> {
        let start = Instant::now();
        while start.elapsed() < timeout {
            match child.try_wait() {
                Ok(Some(status)) => {
                    let poll_start = Instant::now();
                    while poll_start.elapsed() < timeout_exit() {
                        if let Some(err) = crate::daemon_process::read_startup_error() {
                            return Err(ClientError::DaemonStartFailed(err));
                        }
                        std::thread::sleep(poll_interval());
                    }
                    return Err(ClientError::DaemonStartFailed(format!(
                        "exited with {status}"
                    )));
                }
                Ok(None) => {}
                Err(_) => {}
            }

            match Self::connect() {
                Ok(client) => return Ok(client),
                Err(ClientError::DaemonNotRunning) => {
                    tokio::time::sleep(poll_interval()).await;
                }
                Err(e) => return Err(wrap_with_startup_error(e)),
            }
        }

        Err(wrap_with_startup_error(ClientError::DaemonStartTimeout))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<Value>,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = format!("{}{path}", self.base_url);
        let mut req = self.http.request(method, url).timeout(timeout_ipc());
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }

        let response = match req.send().await {
            Ok(r) => r,
            Err(e) => {
                let err = ClientError::Request(e);
                log_connection_error(&err);
                return Err(err);
            }
        };

        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            let envelope: OkEnvelope = serde_json::from_slice(&bytes)
                .map_err(|_| ClientError::UnexpectedResponse)?;
            serde_json::from_value(envelope.data).map_err(|_| ClientError::UnexpectedResponse)
        } else {
            let envelope: ErrorEnvelope = serde_json::from_slice(&bytes)
                .map_err(|_| ClientError::UnexpectedResponse)?;
            Err(ClientError::Rejected {
                code: envelope.error.code,
                message: envelope.error.message,
            })
        }
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let value = serde_json::to_value(body).map_err(|_| ClientError::UnexpectedResponse)?;
        self.send(reqwest::Method::POST, path, Some(value), &[])
            .await
    }

    async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let value = serde_json::to_value(body).map_err(|_| ClientError::UnexpectedResponse)?;
        self.send(reqwest::Method::PATCH, path, Some(value), &[])
            .await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        self.send(reqwest::Method::GET, path, None, query).await
    }

    // --- projects ---

    pub async fn register_project(
        &self,
        project_id: &str,
        repo_root: &std::path::Path,
        display_name: Option<&str>,
    ) -> Result<Value, ClientError> {
        self.post(
            "/api/v1/projects",
            &serde_json::json!({
                "project_id": project_id,
                "repo_root": repo_root,
                "display_name": display_name,
            }),
        )
        .await
    }

    pub async fn project_tree(&self, project_id: &str) -> Result<Value, ClientError> {
        self.get(&format!("/api/v1/projects/{project_id}/tree"), &[])
            .await
    }

    pub async fn archive_done(&self, project_id: &str) -> Result<Value, ClientError> {
        self.post(
            &format!("/api/v1/projects/{project_id}/archive-done"),
            &serde_json::json!({}),
        )
        .await
    }

    // --- tasks ---

    pub async fn create_task(&self, project_id: &str, title: &str) -> Result<Value, ClientError> {
        self.post(
            "/api/v1/tasks",
            &serde_json::json!({"project_id": project_id, "title": title}),
        )
        .await
    }

    pub async fn derive_task(
        &self,
        parent_id: &str,
        project_id: &str,
        title: &str,
        child_role: Option<&str>,
    ) -> Result<Value, ClientError> {
        self.post(
            &format!("/api/v1/tasks/{parent_id}/derive"),
            &serde_json::json!({
                "project_id": project_id,
                "title": title,
                "child_role": child_role,
            }),
        )
        .await
    }

    pub async fn adopt_pane(
        &self,
        parent_id: &str,
        project_id: &str,
        title: &str,
        child_role: Option<&str>,
        pane_id: &str,
        pane_target: &str,
    ) -> Result<Value, ClientError> {
        self.post(
            &format!("/api/v1/tasks/{parent_id}/adopt-pane"),
            &serde_json::json!({
                "project_id": project_id,
                "title": title,
                "child_role": child_role,
                "pane_id": pane_id,
                "pane_target": pane_target,
            }),
        )
        .await
    }

    pub async fn set_status(&self, task_id: &str, status: &str) -> Result<Value, ClientError> {
        self.patch(
            &format!("/api/v1/tasks/{task_id}/status"),
            &serde_json::json!({"status": status}),
        )
        .await
    }

    pub async fn set_checked(&self, task_id: &str, checked: bool) -> Result<Value, ClientError> {
        self.patch(
            &format!("/api/v1/tasks/{task_id}/check"),
            &serde_json::json!({"checked": checked}),
        )
        .await
    }

    pub async fn set_title(&self, task_id: &str, title: &str) -> Result<Value, ClientError> {
        self.patch(
            &format!("/api/v1/tasks/{task_id}/title"),
            &serde_json::json!({"title": title}),
        )
        .await
    }

    pub async fn set_description(
        &self,
        task_id: &str,
        description: &str,
    ) -> Result<Value, ClientError> {
        self.patch(
            &format!("/api/v1/tasks/{task_id}/description"),
            &serde_json::json!({"description": description}),
        )
        .await
    }

    pub async fn set_flag(
        &self,
        task_id: &str,
        flag: &str,
        flag_desc: &str,
    ) -> Result<Value, ClientError> {
        self.patch(
            &format!("/api/v1/tasks/{task_id}/flag"),
            &serde_json::json!({"flag": flag, "flag_desc": flag_desc}),
        )
        .await
    }

    pub async fn set_flag_readed(
        &self,
        task_id: &str,
        flag_readed: bool,
    ) -> Result<Value, ClientError> {
        self.patch(
            &format!("/api/v1/tasks/{task_id}/flag-readed"),
            &serde_json::json!({"flag_readed": flag_readed}),
        )
        .await
    }

    pub async fn set_autopilot(&self, task_id: &str, enabled: bool) -> Result<Value, ClientError> {
        self.patch(
            &format!("/api/v1/tasks/{task_id}/autopilot"),
            &serde_json::json!({"enabled": enabled}),
        )
        .await
    }

    pub async fn post_message(
        &self,
        task_id: &str,
        source: &str,
        content: &str,
        flag: &str,
        flag_desc: &str,
    ) -> Result<Value, ClientError> {
        self.post(
            &format!("/api/v1/tasks/{task_id}/messages"),
            &serde_json::json!({
                "source": source,
                "content": content,
                "flag": flag,
                "flag_desc": flag_desc,
            }),
        )
        .await
    }

    // --- panes ---

    pub async fn create_root_pane(
        &self,
        project_id: &str,
        title: &str,
    ) -> Result<Value, ClientError> {
        self.post(
            &format!("/api/v1/projects/{project_id}/panes/root"),
            &serde_json::json!({"title": title}),
        )
        .await
    }

    pub async fn create_sibling_pane(
        &self,
        target_task_id: &str,
        project_id: &str,
        title: &str,
    ) -> Result<Value, ClientError> {
        self.post(
            &format!("/api/v1/tasks/{target_task_id}/panes/sibling"),
            &serde_json::json!({"project_id": project_id, "title": title}),
        )
        .await
    }

    pub async fn create_child_pane(
        &self,
        target_task_id: &str,
        project_id: &str,
        title: &str,
    ) -> Result<Value, ClientError> {
        self.post(
            &format!("/api/v1/tasks/{target_task_id}/panes/child"),
            &serde_json::json!({"project_id": project_id, "title": title}),
        )
        .await
    }

    pub async fn reopen_pane(&self, task_id: &str) -> Result<Value, ClientError> {
        self.post(
            &format!("/api/v1/tasks/{task_id}/panes/reopen"),
            &serde_json::json!({}),
        )
        .await
    }

    pub async fn manual_launch_pane(
        &self,
        project_id: &str,
        target_task_id: Option<&str>,
        title: &str,
    ) -> Result<Value, ClientError> {
        // The route carries an unused `:id` path segment (the target task,
        // if any, is named in the body instead); `_` satisfies the router.
        self.post(
            "/api/v1/tasks/_/panes/manual-launch",
            &serde_json::json!({
                "project_id": project_id,
                "target_task_id": target_task_id,
                "title": title,
            }),
        )
        .await
    }

    pub async fn get_task_pane(&self, task_id: &str) -> Result<Value, ClientError> {
        self.get(&format!("/api/v1/tasks/{task_id}/pane"), &[]).await
    }

    pub async fn pane_history(
        &self,
        task_id: &str,
        lines: Option<u32>,
    ) -> Result<Value, ClientError> {
        let query: Vec<(&str, String)> = match lines {
            Some(n) => vec![("lines", n.to_string())],
            None => vec![],
        };
        self.get(&format!("/api/v1/tasks/{task_id}/pane-history"), &query)
            .await
    }

    /// Report a pane as idle — the entry point an external pane-idle watcher
    /// uses to drive `AutoCompleteByPane`.
    pub async fn auto_complete_pane(
        &self,
        pane_target: &str,
        summary: &str,
        trigger_source: &str,
        observed_last_active_at: i64,
    ) -> Result<Value, ClientError> {
        self.post(
            "/api/v1/panes/auto-complete",
            &serde_json::json!({
                "pane_target": pane_target,
                "summary": summary,
                "trigger_source": trigger_source,
                "observed_last_active_at": observed_last_active_at,
            }),
        )
        .await
    }

    // --- runs ---

    pub async fn create_run(&self, task_id: &str) -> Result<Value, ClientError> {
        self.post(
            &format!("/api/v1/tasks/{task_id}/runs"),
            &serde_json::json!({}),
        )
        .await
    }

    pub async fn bind_pane(
        &self,
        run_id: &str,
        pane_target: Option<&str>,
    ) -> Result<Value, ClientError> {
        self.post(
            &format!("/api/v1/runs/{run_id}/bind-pane"),
            &serde_json::json!({"pane_target": pane_target}),
        )
        .await
    }

    pub async fn resume_run(&self, run_id: &str) -> Result<Value, ClientError> {
        self.post(
            &format!("/api/v1/runs/{run_id}/resume"),
            &serde_json::json!({}),
        )
        .await
    }

    // --- config / system ---

    pub async fn get_config(&self) -> Result<Value, ClientError> {
        self.get("/api/v1/config", &[]).await
    }

    pub async fn patch_config(&self, patch: Value) -> Result<Value, ClientError> {
        self.patch("/api/v1/config", &patch).await
    }

    pub async fn capabilities(&self) -> Result<Value, ClientError> {
        self.get("/api/v1/system/capabilities", &[]).await
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
