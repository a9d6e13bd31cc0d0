// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET/PATCH /api/v1/config`: server-level configuration —
//! local port, helper-program, notify-command, helper OpenAI config.

use super::envelope::{ok, ApiResult};
use super::state::{AppState, ServerConfigPatch};
use axum::extract::State;
use axum::Json;

pub async fn get_config(State(state): State<AppState>) -> ApiResult {
    Ok(ok(state.config.read().clone()))
}

pub async fn patch_config(
    State(state): State<AppState>,
    Json(patch): Json<ServerConfigPatch>,
) -> ApiResult {
    let mut config = state.config.write();
    if let Some(port) = patch.port {
        config.port = port;
    }
    if let Some(v) = patch.helper_program {
        config.helper_program = v;
    }
    if let Some(v) = patch.notify_command {
        config.notify_command = v;
    }
    if let Some(v) = patch.helper_openai_base_url {
        config.helper_openai_base_url = v;
    }
    if let Some(v) = patch.helper_openai_model {
        config.helper_openai_model = v;
    }
    Ok(ok(config.clone()))
}
