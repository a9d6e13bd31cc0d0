// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Composite process context: the single place the engine's services reach
//! for global process state, owned in one composite context passed by
//! reference rather than scattered module-level singletons.

use crate::audit::AutopilotLogger;
use crate::error::EngineError;
use crate::prompt::PromptCaches;
use crate::supervisor::Supervisor;
use async_trait::async_trait;
use ojp_adapters::notify::NotifyError;
use ojp_adapters::{AgentLoopRunner, MultiplexerAdapter, NotifyAdapter, ShellRunner};
use ojp_core::{Clock, Event, IdGen};
use ojp_storage::{MaterializedState, Wal};
use parking_lot::Mutex;
use std::sync::Arc;

/// Object-safe counterpart of [`NotifyAdapter`], which carries a `Clone`
/// supertrait bound and so cannot itself be used behind `dyn`.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError>;
}

#[async_trait]
impl<T: NotifyAdapter> Notifier for T {
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        NotifyAdapter::notify(self, title, message).await
    }
}

/// Object-safe counterpart of [`IdGen`], which carries a `Clone` supertrait
/// bound for the same reason.
pub trait IdSource: Send + Sync {
    fn next(&self) -> String;
}

impl<T: IdGen> IdSource for T {
    fn next(&self) -> String {
        IdGen::next(self)
    }
}

/// Fan-out sink for the pub/sub hub (`ojp-daemon::hub`). The engine depends
/// only on this trait so `ojp-engine` never needs to depend on
/// `ojp-daemon`.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, topic: &str, project_id: &str, task_id: &str, payload: serde_json::Value);
}

/// No-op publisher, used by tests and by any caller that doesn't need the
/// pub/sub hub wired up.
pub struct NullPublisher;

impl EventPublisher for NullPublisher {
    fn publish(&self, _topic: &str, _project_id: &str, _task_id: &str, _payload: serde_json::Value) {}
}

/// The composite context every engine service takes by reference. One
/// instance lives for the lifetime of the daemon process.
pub struct EngineContext {
    pub server_instance_id: String,
    /// User config directory (`CONFIG_DIR` env): system skills, system
    /// sidecar fallback, and the audit log all live under it.
    pub config_dir: std::path::PathBuf,
    /// Default delay before the child-spawn autopilot fallback fires,
    /// floored to 1.5s by callers.
    pub child_spawn_fallback_delay: std::time::Duration,
    pub state: Arc<Mutex<MaterializedState>>,
    pub wal: Arc<Mutex<Wal>>,
    pub clock: Arc<dyn Clock>,
    pub id_gen: Arc<dyn IdSource>,
    pub multiplexer: Arc<dyn MultiplexerAdapter>,
    pub shell: Arc<dyn ShellRunner>,
    pub agent_loop: Option<Arc<dyn AgentLoopRunner>>,
    pub notify: Arc<dyn Notifier>,
    pub hub: Arc<dyn EventPublisher>,
    pub supervisor: Supervisor,
    pub audit: AutopilotLogger,
    pub prompt_caches: PromptCaches,
    /// Completion command run for non-pane-idle autopilot sources.
    pub completion_command: Option<String>,
    /// Per-task resident autopilot flag, default `false`.
    pub autopilot: Mutex<std::collections::HashMap<String, bool>>,
}

impl EngineContext {
    /// Append an event to the WAL and fold it into `MaterializedState`.
    ///
    /// Flushes the WAL synchronously: this control plane has no background
    /// group-commit flusher, so durability happens at the point of emit
    /// rather than on an interval/threshold.
    pub fn emit(&self, event: Event) -> Result<(), EngineError> {
        {
            let mut wal = self.wal.lock();
            wal.append(&event).map_err(|e| EngineError::Storage(e.to_string()))?;
            wal.flush().map_err(|e| EngineError::Storage(e.to_string()))?;
        }
        tracing::debug!(event = %event.log_summary(), "event committed");
        self.state.lock().apply_event(&event);
        Ok(())
    }

    pub fn publish(&self, topic: &str, project_id: &str, task_id: &str, payload: serde_json::Value) {
        self.hub.publish(topic, project_id, task_id, payload);
    }

    pub fn get_autopilot(&self, task_id: &str) -> bool {
        *self.autopilot.lock().get(task_id).unwrap_or(&false)
    }

    pub fn set_autopilot(&self, task_id: &str, enabled: bool) {
        self.autopilot.lock().insert(task_id.to_string(), enabled);
    }
}

/// Test-only builder assembling an `EngineContext` wired with fakes, so
/// every service module's tests share one construction path.
#[cfg(any(test, feature = "test-support"))]
pub struct TestContext {
    pub ctx: Arc<EngineContext>,
    pub dir: tempfile::TempDir,
    pub multiplexer: Arc<ojp_adapters::FakeMultiplexer>,
    pub shell: Arc<ojp_adapters::FakeShellRunner>,
    pub clock: Arc<ojp_core::FakeClock>,
    pub notify: Arc<ojp_adapters::FakeNotifyAdapter>,
}

#[cfg(any(test, feature = "test-support"))]
impl TestContext {
    pub fn new() -> Self {
        Self::with_agent_loop(Some(Arc::new(ojp_adapters::FakeAgentLoopRunner::new())))
    }

    pub fn without_agent_loop() -> Self {
        Self::with_agent_loop(None)
    }

    fn with_agent_loop(agent_loop: Option<Arc<dyn AgentLoopRunner>>) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let wal = Arc::new(Mutex::new(
            Wal::open(&dir.path().join("wal.jsonl"), 0).expect("open wal"),
        ));
        let state = Arc::new(Mutex::new(MaterializedState::default()));
        let clock = Arc::new(ojp_core::FakeClock::new());
        let multiplexer = Arc::new(ojp_adapters::FakeMultiplexer::new());
        let shell = Arc::new(ojp_adapters::FakeShellRunner::new());
        let notify = Arc::new(ojp_adapters::FakeNotifyAdapter::new());
        let hub: Arc<dyn EventPublisher> = Arc::new(NullPublisher);

        let supervisor = Supervisor::new(
            state.clone(),
            wal.clone(),
            clock.clone() as Arc<dyn Clock>,
            agent_loop.clone(),
            hub.clone(),
        );

        let ctx = EngineContext {
            server_instance_id: "srv_test".to_string(),
            config_dir: dir.path().join("config"),
            child_spawn_fallback_delay: std::time::Duration::from_millis(20),
            state,
            wal,
            clock: clock.clone() as Arc<dyn Clock>,
            id_gen: Arc::new(ojp_core::SequentialIdGen::new("id")),
            multiplexer: multiplexer.clone(),
            shell: shell.clone(),
            agent_loop,
            notify: notify.clone(),
            hub,
            supervisor,
            audit: AutopilotLogger::new(dir.path().join("audit.log")),
            prompt_caches: PromptCaches::new(),
            completion_command: None,
            autopilot: Mutex::new(std::collections::HashMap::new()),
        };

        Self {
            ctx: Arc::new(ctx),
            dir,
            multiplexer,
            shell,
            clock,
            notify,
        }
    }

    pub fn register_project(&self, project_id: &str) -> std::path::PathBuf {
        let repo_root = self.dir.path().join(project_id);
        std::fs::create_dir_all(&repo_root).expect("mkdir repo_root");
        self.ctx
            .emit(Event::ProjectRegistered {
                project_id: ojp_core::ProjectId::new(project_id.to_string()),
                repo_root: repo_root.clone(),
                display_name: project_id.to_string(),
                is_git_repo: false,
            })
            .expect("register project");
        repo_root
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
