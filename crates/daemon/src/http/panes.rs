// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/v1/tasks/{id}/pane*` and `/api/v1/projects/{pid}/panes/root`
//! handlers. Pane lifecycle logic lives in
//! `ojp-engine::panes`; these handlers only parse the request and choose
//! which lifecycle operation it names.

use super::envelope::{ok, ApiError, ApiResult};
use super::state::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use ojp_core::RuntimeStatus;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateRootPaneBody {
    pub title: String,
}

pub async fn create_root_pane(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(body): Json<CreateRootPaneBody>,
) -> ApiResult {
    let task = ojp_engine::panes::create_root_pane(&state.ctx, &project_id, &body.title)
        .await
        .map_err(ApiError::from)?;
    Ok(ok(task))
}

#[derive(Debug, Deserialize)]
pub struct CreateRelativePaneBody {
    pub project_id: String,
    pub title: String,
}

pub async fn create_sibling_pane(
    State(state): State<AppState>,
    Path(target_task_id): Path<String>,
    Json(body): Json<CreateRelativePaneBody>,
) -> ApiResult {
    let task = ojp_engine::panes::create_sibling_pane(
        &state.ctx,
        &body.project_id,
        &target_task_id,
        &body.title,
    )
    .await
    .map_err(ApiError::from)?;
    Ok(ok(task))
}

pub async fn create_child_pane(
    State(state): State<AppState>,
    Path(target_task_id): Path<String>,
    Json(body): Json<CreateRelativePaneBody>,
) -> ApiResult {
    let task = ojp_engine::panes::create_child_pane(
        &state.ctx,
        &body.project_id,
        &target_task_id,
        &body.title,
    )
    .await
    .map_err(ApiError::from)?;
    Ok(ok(task))
}

pub async fn reopen_pane(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult {
    let task = ojp_engine::panes::reopen_pane(&state.ctx, &task_id)
        .await
        .map_err(ApiError::from)?;
    Ok(ok(task))
}

#[derive(Debug, Deserialize)]
pub struct ManualLaunchBody {
    pub project_id: String,
    #[serde(default)]
    pub target_task_id: Option<String>,
    pub title: String,
}

pub async fn manual_launch_pane(
    State(state): State<AppState>,
    Json(body): Json<ManualLaunchBody>,
) -> ApiResult {
    let task = ojp_engine::panes::manual_launch_pane(
        &state.ctx,
        &body.project_id,
        body.target_task_id.as_deref(),
        &body.title,
    )
    .await
    .map_err(ApiError::from)?;
    Ok(ok(task))
}

pub async fn get_task_pane(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult {
    let view = ojp_engine::panes::get_task_pane(&state.ctx, &task_id)
        .await
        .map_err(ApiError::from)?;
    Ok(ok(view))
}

#[derive(Debug, Deserialize)]
pub struct PaneHistoryQuery {
    pub lines: Option<u32>,
}

pub async fn pane_history(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Query(query): Query<PaneHistoryQuery>,
) -> ApiResult {
    let capture = ojp_engine::panes::capture_history(&state.ctx, &task_id, query.lines)
        .await
        .map_err(ApiError::from)?;
    Ok(ok(capture))
}

#[derive(Debug, Deserialize)]
pub struct PaneSnapshotEntry {
    pub pane_id: String,
    pub runtime_status: RuntimeStatus,
    pub snapshot: String,
    #[serde(default)]
    pub current_command: String,
    #[serde(default)]
    pub has_cursor: bool,
    #[serde(default)]
    pub cursor_x: u32,
    #[serde(default)]
    pub cursor_y: u32,
}

#[derive(Debug, Deserialize)]
pub struct UpsertPaneSnapshotsBody {
    pub snapshots: Vec<PaneSnapshotEntry>,
}

pub async fn upsert_pane_snapshots(
    State(state): State<AppState>,
    Json(body): Json<UpsertPaneSnapshotsBody>,
) -> ApiResult {
    let updates = body
        .snapshots
        .into_iter()
        .map(|entry| ojp_engine::panes::PaneSnapshotInput {
            pane_id: entry.pane_id,
            runtime_status: entry.runtime_status,
            snapshot: entry.snapshot,
            current_command: entry.current_command,
            has_cursor: entry.has_cursor,
            cursor_x: entry.cursor_x,
            cursor_y: entry.cursor_y,
        })
        .collect();
    let applied = ojp_engine::panes::upsert_pane_snapshots(&state.ctx, updates).map_err(ApiError::from)?;
    Ok(ok(serde_json::json!({"applied": applied})))
}

/// Entry point for an external pane-idle watcher (the "pane-actor"
/// trigger source): the only HTTP surface that reaches `AutoCompleteByPane`.
#[derive(Debug, Default, Deserialize)]
pub struct AutoCompletePaneBody {
    pub pane_target: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub trigger_source: String,
    #[serde(default)]
    pub observed_last_active_at: i64,
    #[serde(default)]
    pub request_meta: std::collections::HashMap<String, String>,
    #[serde(default)]
    pub caller_path: String,
    #[serde(default)]
    pub caller_active_pane: String,
}

pub async fn auto_complete_pane(State(state): State<AppState>, Json(body): Json<AutoCompletePaneBody>) -> ApiResult {
    let input = ojp_engine::autopilot::AutoCompleteInput {
        pane_target: body.pane_target,
        summary: body.summary,
        trigger_source: if body.trigger_source.is_empty() { "pane-actor".to_string() } else { body.trigger_source },
        observed_last_active_at: body.observed_last_active_at,
        request_meta: body.request_meta,
        caller_path: body.caller_path,
        caller_active_pane: body.caller_active_pane,
    };
    let outcome = ojp_engine::autopilot::auto_complete_by_pane(&state.ctx, input)
        .await
        .map_err(ApiError::from)?;
    Ok(ok(outcome))
}
