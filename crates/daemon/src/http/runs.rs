// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/v1/tasks/{id}/runs` and `/api/v1/runs/{rid}/*` handlers.
//! Run lifecycle logic lives in `ojp-engine::runs`.

use super::envelope::{ok, ApiError, ApiResult};
use super::state::AppState;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

pub async fn create_run(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult {
    let run = ojp_engine::runs::create_run(&state.ctx, &task_id).map_err(ApiError::from)?;
    Ok(ok(run))
}

#[derive(Debug, Deserialize, Default)]
pub struct BindPaneBody {
    #[serde(default)]
    pub pane_target: Option<String>,
}

/// Resolve the pane target from body → `X-Active-Pane-Target` header →
/// the task's current binding, in that priority order.
pub async fn bind_pane(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<BindPaneBody>,
) -> ApiResult {
    let task_id = state
        .ctx
        .state
        .lock()
        .get_run(&run_id)
        .map(|r| r.task_id.as_str().to_string())
        .ok_or_else(|| ApiError::not_found("RUN_NOT_FOUND", format!("run not found: {run_id}")))?;

    let header_target = headers
        .get("X-Active-Pane-Target")
        .and_then(|v| v.to_str().ok());

    let target = ojp_engine::runs::resolve_bind_pane_target(
        &state.ctx,
        &task_id,
        body.pane_target.as_deref(),
        header_target,
    )
    .map_err(ApiError::from)?;

    let run = ojp_engine::runs::bind_pane(&state.ctx, &run_id, &target).map_err(ApiError::from)?;
    Ok(ok(run))
}

pub async fn resume_run(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> ApiResult {
    let outcome = ojp_engine::runs::resume_run(&state.ctx, &run_id).map_err(ApiError::from)?;
    Ok(ok(outcome))
}
