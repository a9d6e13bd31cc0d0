// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ojpd — the agent-orchestration control plane daemon.
//!
//! Loads durable state (snapshot + WAL replay), assembles the composite
//! [`ojp_engine::EngineContext`], and serves a JSON+WS
//! control plane over HTTP in place of a Unix-socket command
//! listener — see `DESIGN.md`.

mod env;
mod hub;
mod http;
mod lifecycle;

use std::net::SocketAddr;
use std::sync::Arc;

use lifecycle::Config;
use parking_lot::RwLock;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("ojpd {}", env!("CARGO_PKG_VERSION"));
                return;
            }
            "--help" | "-h" | "help" => {
                println!("ojpd {}", env!("CARGO_PKG_VERSION"));
                println!("Background control-plane daemon for the agent-orchestration system.");
                println!();
                println!("The daemon is typically started by the `ojp` CLI and should not be");
                println!("invoked directly. It serves a JSON+WebSocket API over HTTP.");
                return;
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: ojpd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("failed to load config: {e}");
            std::process::exit(1);
        }
    };

    let _log_guard = setup_logging(&config);

    info!("starting ojpd");

    let startup = match lifecycle::startup(&config) {
        Ok(r) => r,
        Err(lifecycle::LifecycleError::LockFailed(_)) => {
            eprintln!("ojpd is already running (lock held at {})", config.lock_path.display());
            std::process::exit(1);
        }
        Err(e) => {
            error!("failed to start daemon: {}", e);
            std::process::exit(1);
        }
    };

    let server_config = http::state::ServerConfig {
        port: config.http_port,
        ..Default::default()
    };
    let state = http::state::AppState {
        ctx: Arc::clone(&startup.ctx),
        hub: startup.hub,
        config: Arc::new(RwLock::new(server_config)),
    };
    let app = http::build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.http_port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("failed to bind {}: {}", addr, e);
            lifecycle::shutdown(&config);
            std::process::exit(1);
        }
    };
    let bound_addr = listener.local_addr().unwrap_or(addr);

    let port_path = config.state_dir.join("daemon.port");
    if let Err(e) = std::fs::write(&port_path, bound_addr.port().to_string()) {
        error!("failed to write port file: {}", e);
    }

    info!("ready, listening on {}", bound_addr);
    println!("READY {}", bound_addr);

    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .expect("install SIGTERM handler");
    let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
        .expect("install SIGINT handler");

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
            _ = sigint.recv() => info!("received SIGINT, shutting down"),
        }
    });

    if let Err(e) = server.await {
        error!("server error: {}", e);
    }

    lifecycle::shutdown(&config);
    info!("ojpd stopped");
}

fn setup_logging(config: &Config) -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_dir = config.state_dir.clone();
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::never(&log_dir, "daemon.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    guard
}
