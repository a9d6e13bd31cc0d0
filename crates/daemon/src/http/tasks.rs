// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/v1/tasks*` and `/api/v1/projects/{pid}/{tree,archive-done}`
//! handlers. Each handler does request parsing and envelope
//! wrapping only; all domain logic lives in `ojp-engine::tasks`.

use super::envelope::{ok, ApiError, ApiResult};
use super::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use ojp_core::{TaskRole, TaskStatus};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateTaskBody {
    pub project_id: String,
    pub title: String,
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(body): Json<CreateTaskBody>,
) -> ApiResult {
    let task = ojp_engine::tasks::create_task(&state.ctx, &body.project_id, None, &body.title)
        .await
        .map_err(ApiError::from)?;
    Ok(ok(task))
}

#[derive(Debug, Deserialize)]
pub struct DeriveTaskBody {
    pub project_id: String,
    pub title: String,
    #[serde(default)]
    pub child_role: Option<String>,
}

pub async fn derive_task(
    State(state): State<AppState>,
    Path(parent_id): Path<String>,
    Json(body): Json<DeriveTaskBody>,
) -> ApiResult {
    let role = match &body.child_role {
        Some(r) => TaskRole::from_str_relaxed(r).map_err(ApiError::from)?,
        None => TaskRole::Unset,
    };
    let task =
        ojp_engine::tasks::derive_task(&state.ctx, &body.project_id, &parent_id, &body.title, role)
            .await
            .map_err(ApiError::from)?;
    Ok(ok(task))
}

#[derive(Debug, Deserialize)]
pub struct AdoptPaneBody {
    pub project_id: String,
    pub title: String,
    #[serde(default)]
    pub child_role: Option<String>,
    pub pane_id: String,
    pub pane_target: String,
}

pub async fn adopt_pane(
    State(state): State<AppState>,
    Path(parent_id): Path<String>,
    Json(body): Json<AdoptPaneBody>,
) -> ApiResult {
    let role = match &body.child_role {
        Some(r) => TaskRole::from_str_relaxed(r).map_err(ApiError::from)?,
        None => TaskRole::Unset,
    };
    let task = ojp_engine::panes::adopt_pane(
        &state.ctx,
        &body.project_id,
        &parent_id,
        &body.title,
        role,
        &body.pane_id,
        &body.pane_target,
    )
    .await
    .map_err(ApiError::from)?;
    Ok(ok(task))
}

fn require_task(state: &AppState, task_id: &str) -> Result<ojp_core::Task, ApiError> {
    state
        .ctx
        .state
        .lock()
        .get_task(task_id)
        .cloned()
        .ok_or_else(|| ApiError::not_found("TASK_NOT_FOUND", format!("task not found: {task_id}")))
}

pub async fn set_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult {
    let status_str = body.get("status").and_then(|v| v.as_str()).unwrap_or("");
    let status = match status_str {
        "pending" => TaskStatus::Pending,
        "running" => TaskStatus::Running,
        "waiting_user" => TaskStatus::WaitingUser,
        "waiting_children" => TaskStatus::WaitingChildren,
        "completed" => TaskStatus::Completed,
        "failed" => TaskStatus::Failed,
        "canceled" => TaskStatus::Canceled,
        other => {
            return Err(ApiError::bad_request(
                "INVALID_TASK",
                format!("unknown status: {other:?}"),
            ))
        }
    };
    ojp_engine::tasks::set_status(&state.ctx, &task_id, status).map_err(ApiError::from)?;
    Ok(ok(require_task(&state, &task_id)?))
}

pub async fn set_checked(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult {
    let checked = body.get("checked").and_then(|v| v.as_bool()).unwrap_or(false);
    ojp_engine::tasks::set_checked(&state.ctx, &task_id, checked).map_err(ApiError::from)?;
    Ok(ok(require_task(&state, &task_id)?))
}

pub async fn set_title(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult {
    let title = body.get("title").and_then(|v| v.as_str()).unwrap_or("");
    ojp_engine::tasks::set_title(&state.ctx, &task_id, title).map_err(ApiError::from)?;
    Ok(ok(require_task(&state, &task_id)?))
}

pub async fn set_description(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult {
    let description = body.get("description").and_then(|v| v.as_str()).unwrap_or("");
    ojp_engine::tasks::set_description(&state.ctx, &task_id, description).map_err(ApiError::from)?;
    Ok(ok(require_task(&state, &task_id)?))
}

pub async fn set_flag_readed(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult {
    let flag_readed = body.get("flag_readed").and_then(|v| v.as_bool()).unwrap_or(true);
    ojp_engine::tasks::set_flag_readed(&state.ctx, &task_id, flag_readed).map_err(ApiError::from)?;
    Ok(ok(require_task(&state, &task_id)?))
}

pub async fn set_autopilot(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult {
    let enabled = body.get("enabled").and_then(|v| v.as_bool()).unwrap_or(false);
    ojp_engine::tasks::set_autopilot(&state.ctx, &task_id, enabled).map_err(ApiError::from)?;
    Ok(ok(require_task(&state, &task_id)?))
}

/// Internal helper also reachable via `POST /tasks/{id}/messages` with
/// `source=task_set_flag`; kept here since it operates purely on task state.
pub async fn set_flag(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult {
    let flag = body.get("flag").and_then(|v| v.as_str()).unwrap_or("");
    let flag_desc = body.get("flag_desc").and_then(|v| v.as_str()).unwrap_or("");
    ojp_engine::tasks::set_flag(&state.ctx, &task_id, flag, flag_desc).map_err(ApiError::from)?;
    Ok(ok(require_task(&state, &task_id)?))
}

pub async fn project_tree(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult {
    let tree = ojp_engine::tasks::project_tree(&state.ctx, &project_id);
    Ok(ok(tree))
}

pub async fn archive_done(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult {
    let archived = ojp_engine::tasks::archive_done(&state.ctx, &project_id).map_err(ApiError::from)?;
    Ok(ok(serde_json::json!({"archived": archived})))
}
