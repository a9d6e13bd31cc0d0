// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP control plane: a JSON API over axum plus the `/ws`
//! pub/sub stream, laid out one file per resource group with a shared
//! `error`/envelope module and a dedicated `ws` module — see `DESIGN.md`.

pub mod config;
pub mod envelope;
pub mod messages;
pub mod panes;
pub mod projects;
pub mod runs;
pub mod state;
pub mod system;
pub mod tasks;
pub mod ws;

use axum::routing::{get, patch, post};
use axum::Router;
use state::AppState;
use tower_http::trace::TraceLayer;

/// Build the full `/api/v1/*` + `/ws` router over a shared [`AppState`].
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/projects", post(projects::register_project))
        .route("/api/v1/projects/:pid/panes/root", post(panes::create_root_pane))
        .route("/api/v1/projects/:pid/tree", get(tasks::project_tree))
        .route("/api/v1/projects/:pid/archive-done", post(tasks::archive_done))
        .route("/api/v1/tasks", post(tasks::create_task))
        .route("/api/v1/tasks/:id/derive", post(tasks::derive_task))
        .route("/api/v1/tasks/:id/adopt-pane", post(tasks::adopt_pane))
        .route("/api/v1/tasks/:id/panes/sibling", post(panes::create_sibling_pane))
        .route("/api/v1/tasks/:id/panes/child", post(panes::create_child_pane))
        .route("/api/v1/tasks/:id/panes/reopen", post(panes::reopen_pane))
        .route("/api/v1/tasks/:id/panes/manual-launch", post(panes::manual_launch_pane))
        .route("/api/v1/tasks/:id/pane", get(panes::get_task_pane))
        .route("/api/v1/tasks/:id/pane-history", get(panes::pane_history))
        .route("/api/v1/panes/snapshots", post(panes::upsert_pane_snapshots))
        .route("/api/v1/panes/auto-complete", post(panes::auto_complete_pane))
        .route("/api/v1/tasks/:id/status", patch(tasks::set_status))
        .route("/api/v1/tasks/:id/check", patch(tasks::set_checked))
        .route("/api/v1/tasks/:id/title", patch(tasks::set_title))
        .route("/api/v1/tasks/:id/description", patch(tasks::set_description))
        .route("/api/v1/tasks/:id/flag", patch(tasks::set_flag))
        .route("/api/v1/tasks/:id/flag-readed", patch(tasks::set_flag_readed))
        .route("/api/v1/tasks/:id/autopilot", patch(tasks::set_autopilot))
        .route("/api/v1/tasks/:id/messages", post(messages::post_message))
        .route("/api/v1/tasks/:id/runs", post(runs::create_run))
        .route("/api/v1/runs/:rid/bind-pane", post(runs::bind_pane))
        .route("/api/v1/runs/:rid/resume", post(runs::resume_run))
        .route("/api/v1/config", get(config::get_config).patch(config::patch_config))
        .route("/api/v1/system/capabilities", get(system::capabilities))
        .route("/api/v1/system/app-programs", get(system::app_programs))
        .route("/api/v1/system/uploads/image", post(system::upload_image))
        .route("/ws", get(ws::ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
