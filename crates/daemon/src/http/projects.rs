// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /api/v1/projects` — register a project.
//!
//! Projects are conceptually registered externally and their lifecycle
//! lies outside the core, but nothing else in the external interface can
//! create one, and every other project-scoped endpoint (`panes/root`,
//! `tree`, `archive-done`) requires one to already exist. See `DESIGN.md`.

use super::envelope::{ok, ApiError, ApiResult};
use super::state::AppState;
use axum::extract::State;
use axum::Json;
use ojp_core::{Event, ProjectId};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RegisterProjectBody {
    pub project_id: String,
    pub repo_root: std::path::PathBuf,
    #[serde(default)]
    pub display_name: Option<String>,
}

pub async fn register_project(
    State(state): State<AppState>,
    Json(body): Json<RegisterProjectBody>,
) -> ApiResult {
    if state.ctx.state.lock().projects.contains_key(&body.project_id) {
        return Err(ApiError::new(
            axum::http::StatusCode::CONFLICT,
            "PROJECT_ALREADY_REGISTERED",
            format!("project already registered: {}", body.project_id),
        ));
    }

    let is_git_repo = body.repo_root.join(".git").exists();
    let display_name = body.display_name.unwrap_or_else(|| body.project_id.clone());

    state
        .ctx
        .emit(Event::ProjectRegistered {
            project_id: ProjectId::new(body.project_id.clone()),
            repo_root: body.repo_root,
            display_name,
            is_git_repo,
        })
        .map_err(ApiError::from)?;

    let project = state.ctx.state.lock().projects.get(&body.project_id).cloned();
    Ok(ok(project))
}
