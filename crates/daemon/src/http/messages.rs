// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /api/v1/tasks/{id}/messages`. Routing between the
//! five message sources lives in `ojp-engine::messages::post_message`.

use super::envelope::{ok, ApiError, ApiResult};
use super::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use ojp_engine::{MessagePostOutcome, MessageRequest, MessageSource};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PostMessageBody {
    pub source: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub flag: String,
    #[serde(default)]
    pub flag_desc: String,
}

pub async fn post_message(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(body): Json<PostMessageBody>,
) -> ApiResult {
    let source = MessageSource::parse(&body.source).map_err(ApiError::from)?;
    let request = MessageRequest {
        content: body.content,
        flag: body.flag,
        flag_desc: body.flag_desc,
    };
    let outcome: MessagePostOutcome =
        ojp_engine::messages::post_message(&state.ctx, &task_id, source, request)
            .await
            .map_err(ApiError::from)?;
    Ok(ok(serde_json::json!({"outcome": outcome})))
}
