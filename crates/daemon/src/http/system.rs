// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /api/v1/system/{capabilities,app-programs}` and
//! `POST /api/v1/system/uploads/image`. The app-program config store and
//! image upload storage live outside this control plane as external
//! collaborators; these handlers validate the boundary contract
//! (size/mime limits, capability flags) without owning storage for either.

use super::envelope::{ok, ApiError, ApiResult};
use super::state::AppState;
use axum::extract::{Multipart, State};
use serde::Serialize;

const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct Capabilities {
    pub agent_loop_available: bool,
    pub multiplexer: &'static str,
    pub notify_available: bool,
}

pub async fn capabilities(State(state): State<AppState>) -> ApiResult {
    Ok(ok(Capabilities {
        agent_loop_available: state.ctx.agent_loop.is_some(),
        multiplexer: "tmux",
        notify_available: true,
    }))
}

/// The app-program config store lives outside this control plane, so
/// this always returns an empty list.
pub async fn app_programs() -> ApiResult {
    Ok(ok(Vec::<serde_json::Value>::new()))
}

#[derive(Debug, Serialize)]
pub struct UploadAccepted {
    pub bytes: usize,
    pub content_type: String,
}

/// Accepts a single `image/*` part up to 16 MiB. Storage of the uploaded
/// bytes lives outside this control plane; this only enforces the
/// boundary contract (`FILE_TOO_LARGE`, mime rejection).
pub async fn upload_image(mut multipart: Multipart) -> ApiResult {
    let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request("INVALID_UPLOAD", e.to_string()))?
    else {
        return Err(ApiError::bad_request("INVALID_UPLOAD", "missing file part"));
    };

    let content_type = field.content_type().unwrap_or("").to_string();
    if !content_type.starts_with("image/") {
        return Err(ApiError::bad_request(
            "INVALID_UPLOAD_MIME",
            format!("expected image/*, got {content_type:?}"),
        ));
    }

    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::bad_request("INVALID_UPLOAD", e.to_string()))?;
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(ApiError::new(
            axum::http::StatusCode::BAD_REQUEST,
            "FILE_TOO_LARGE",
            format!("upload is {} bytes, limit is {MAX_UPLOAD_BYTES}", bytes.len()),
        ));
    }

    Ok(ok(UploadAccepted { bytes: bytes.len(), content_type }))
}
