// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The two JSON response envelopes every handler returns:
//! `{ok:true, data:…}` on success, `{ok:false, error:{code, message}}` on
//! failure, built from `EngineError`'s and `CoreError`'s
//! `code()`/`is_validation()` methods.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ojp_engine::EngineError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub ok: bool,
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct OkEnvelope<T> {
    pub ok: bool,
    pub data: T,
}

/// Wrap a successful payload in the `{ok:true, data:…}` envelope.
pub fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(OkEnvelope { ok: true, data })).into_response()
}

/// An API error: the HTTP-facing wrapper around [`EngineError`] that also
/// carries the status code the error maps to.
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into() }
    }

    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, code, message)
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorEnvelope {
            ok: false,
            error: ErrorBody { code: self.code.to_string(), message: self.message },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let status = status_for(&err);
        let code = err.code();
        ApiError { status, code, message: err.to_string() }
    }
}

impl From<ojp_core::CoreError> for ApiError {
    fn from(err: ojp_core::CoreError) -> Self {
        ApiError { status: StatusCode::BAD_REQUEST, code: err.code(), message: err.to_string() }
    }
}

/// Map an [`EngineError`] to the HTTP status its kind assigns:
/// validation → 400, not-found → 404, conflict → 409, unavailable → 500/501.
fn status_for(err: &EngineError) -> StatusCode {
    if err.is_validation() {
        return StatusCode::BAD_REQUEST;
    }
    match err {
        EngineError::TaskNotFound(_)
        | EngineError::RunNotFound(_)
        | EngineError::ProjectNotFound(_)
        | EngineError::PaneBindingNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::PaneAlreadyBound(_) => StatusCode::CONFLICT,
        EngineError::PlannerOnlySpawnExecutor | EngineError::ExecutorCannotDelegate => {
            StatusCode::BAD_REQUEST
        }
        EngineError::AgentLoopUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::AgentLoopFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::Multiplexer(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::Shell(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::TaskCreateFailed(_) | EngineError::Storage(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        EngineError::FileTooLarge(_) => StatusCode::BAD_REQUEST,
        EngineError::Core(_) => StatusCode::BAD_REQUEST,
    }
}

pub type ApiResult = Result<Response, ApiError>;
