// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: config resolution, state-dir locking, WAL
//! replay, and assembly of the composite [`EngineContext`] every HTTP
//! handler shares.
//!
//! Follows a state-dir/lock-file/snapshot+WAL-replay shape, stripped of
//! the job-runtime (`Runtime`, `RuntimeDeps`, background reconciliation,
//! usage-metrics collector, breadcrumb-orphan scan) this control plane
//! has no counterpart for — see `DESIGN.md`.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use fs2::FileExt;
use ojp_adapters::{DesktopNotifyAdapter, RealShellRunner, TmuxMultiplexer};
use ojp_core::SystemClock;
use ojp_engine::{AutopilotLogger, EngineContext, EventPublisher, Notifier, PromptCaches, Supervisor};
use ojp_storage::{MaterializedState, Snapshot, Wal};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{info, warn};

use crate::hub::Hub;

/// Daemon configuration: state-dir-relative paths plus the env-derived
/// identity/port values.
#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub lock_path: PathBuf,
    pub wal_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub config_dir: PathBuf,
    pub server_instance_id: String,
    pub http_port: u16,
}

impl Config {
    pub fn load() -> Result<Self, LifecycleError> {
        let state_dir = crate::env::state_dir()?;
        Ok(Self {
            lock_path: state_dir.join("daemon.pid"),
            wal_path: state_dir.join("wal").join("events.jsonl"),
            snapshot_path: state_dir.join("snapshot.json"),
            config_dir: crate::env::config_dir(),
            server_instance_id: crate::env::server_instance_id(),
            http_port: crate::env::http_port(),
            state_dir,
        })
    }
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not determine state directory")]
    NoStateDir,
    #[error("failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),
    #[error("WAL error: {0}")]
    Wal(#[from] ojp_storage::WalError),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] ojp_storage::SnapshotError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of a successful startup: the assembled context plus the held
/// lock file (dropping it releases the exclusive lock).
pub struct StartupResult {
    pub ctx: Arc<EngineContext>,
    pub hub: Hub,
    #[allow(dead_code)]
    lock_file: File,
}

/// Acquire the state-dir lock, replay durable state, and assemble the
/// process-wide [`EngineContext`].
///
/// Only one daemon may run per state directory at a time; the lock file
/// prevents two daemons from racing on the same WAL.
pub fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;

    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;
    {
        use std::io::Write;
        let mut f = &lock_file;
        f.set_len(0)?;
        writeln!(f, "{}", std::process::id())?;
    }

    let (mut state, processed_seq) = match Snapshot::load(&config.snapshot_path)? {
        Some(snapshot) => {
            info!(
                seq = snapshot.seq,
                projects = snapshot.state.projects.len(),
                tasks = snapshot.state.tasks.len(),
                "loaded snapshot"
            );
            (snapshot.state, snapshot.seq)
        }
        None => {
            info!("no snapshot found, starting with empty state");
            (MaterializedState::default(), 0)
        }
    };

    let mut wal = Wal::open(&config.wal_path, processed_seq)?;
    let replay = wal.entries_after(processed_seq)?;
    let replay_count = replay.len();
    for entry in &replay {
        state.apply_event(&entry.event);
        wal.mark_processed(entry.seq);
    }
    if replay_count > 0 {
        info!(replay_count, "replayed WAL entries after snapshot");
    }

    let hub = Hub::new();
    let hub_publisher: Arc<dyn EventPublisher> = Arc::new(hub.clone());

    let state = Arc::new(Mutex::new(state));
    let wal = Arc::new(Mutex::new(wal));
    let clock: Arc<dyn ojp_core::Clock> = Arc::new(SystemClock);
    let multiplexer: Arc<dyn ojp_adapters::MultiplexerAdapter> = Arc::new(
        match crate::env::tmux_socket() {
            Some(socket) => TmuxMultiplexer::with_socket(socket),
            None => TmuxMultiplexer::new(),
        },
    );
    let shell: Arc<dyn ojp_adapters::ShellRunner> = Arc::new(RealShellRunner::new());
    let notify: Arc<dyn Notifier> = Arc::new(DesktopNotifyAdapter::new());

    // No agent-loop runner is injected by default: the LLM agent runner is
    // an external collaborator this crate never implements a concrete
    // backend for. Without one, `Supervisor::enqueue` fails closed with
    // `ErrTaskAgentLoopUnavailable`.
    let agent_loop: Option<Arc<dyn ojp_adapters::AgentLoopRunner>> = None;

    let supervisor = Supervisor::new(
        state.clone(),
        wal.clone(),
        clock.clone(),
        agent_loop.clone(),
        hub_publisher.clone(),
    );

    let audit_log_path = config.config_dir.join("logs/task-completion-automation.log");
    let ctx = EngineContext {
        server_instance_id: config.server_instance_id.clone(),
        config_dir: config.config_dir.clone(),
        child_spawn_fallback_delay: std::time::Duration::from_secs(6),
        state,
        wal,
        clock,
        id_gen: Arc::new(ojp_core::UuidIdGen),
        multiplexer,
        shell,
        agent_loop,
        notify,
        hub: hub_publisher,
        supervisor,
        audit: AutopilotLogger::new(audit_log_path),
        prompt_caches: PromptCaches::new(),
        completion_command: std::env::var("OJP_COMPLETION_COMMAND").ok(),
        autopilot: Mutex::new(std::collections::HashMap::new()),
    };

    info!(server_instance_id = %ctx.server_instance_id, "daemon started");

    Ok(StartupResult {
        ctx: Arc::new(ctx),
        hub,
        lock_file,
    })
}

/// Release daemon-held resources. The lock file is released automatically
/// when `StartupResult` is dropped; this only covers best-effort cleanup.
pub fn shutdown(config: &Config) {
    if config.lock_path.exists() {
        if let Err(e) = std::fs::remove_file(&config.lock_path) {
            warn!("failed to remove lock file: {}", e);
        }
    }
    let port_path = config.state_dir.join("daemon.port");
    if port_path.exists() {
        let _ = std::fs::remove_file(&port_path);
    }
}

#[cfg(test)]
#[path = "../lifecycle_tests.rs"]
mod tests;
