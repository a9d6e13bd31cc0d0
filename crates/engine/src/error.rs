// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the task/pane/run control plane.

use ojp_adapters::{AgentLoopError, MultiplexerError, ShellError};
use ojp_core::CoreError;
use thiserror::Error;

/// Errors raised by the engine's lifecycle services, the autopilot engine,
/// and the agent-loop supervisor. Each variant carries a stable
/// UPPER_SNAKE_CASE [`code`](EngineError::code) so `ojp-daemon`'s HTTP layer
/// never has to re-derive an error code from a display message.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("task not found: {0}")]
    TaskNotFound(String),
    #[error("run not found: {0}")]
    RunNotFound(String),
    #[error("project not found: {0}")]
    ProjectNotFound(String),
    #[error("no pane bound to task {0}")]
    PaneBindingNotFound(String),

    #[error("pane_target {0:?} is already bound to another task")]
    PaneAlreadyBound(String),
    #[error("planner tasks may only spawn executor children")]
    PlannerOnlySpawnExecutor,
    #[error("executor tasks cannot delegate")]
    ExecutorCannotDelegate,

    #[error("agent loop runner is not configured")]
    AgentLoopUnavailable,
    #[error("agent loop run failed: {0}")]
    AgentLoopFailed(#[from] AgentLoopError),

    #[error("multiplexer operation failed: {0}")]
    Multiplexer(#[from] MultiplexerError),
    #[error("completion command failed: {0}")]
    Shell(#[from] ShellError),

    #[error("failed to create task: {0}")]
    TaskCreateFailed(String),
    #[error("failed to persist state: {0}")]
    Storage(String),

    #[error("upload too large: {0} bytes")]
    FileTooLarge(usize),
}

impl EngineError {
    /// Stable UPPER_SNAKE_CASE error code.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Core(core) => core.code(),
            EngineError::TaskNotFound(_) => "TASK_NOT_FOUND",
            EngineError::RunNotFound(_) => "RUN_NOT_FOUND",
            EngineError::ProjectNotFound(_) => "PROJECT_NOT_FOUND",
            EngineError::PaneBindingNotFound(_) => "PANE_BINDING_NOT_FOUND",
            EngineError::PaneAlreadyBound(_) => "PANE_ALREADY_BOUND",
            EngineError::PlannerOnlySpawnExecutor => "PLANNER_ONLY_SPAWN_EXECUTOR",
            EngineError::ExecutorCannotDelegate => "EXECUTOR_CANNOT_DELEGATE",
            EngineError::AgentLoopUnavailable => "AGENT_LOOP_UNAVAILABLE",
            EngineError::AgentLoopFailed(_) => "AGENT_LOOP_FAILED",
            EngineError::Multiplexer(_) => "PANE_SERVICE_UNAVAILABLE",
            EngineError::Shell(_) => "SHELL_UNAVAILABLE",
            EngineError::TaskCreateFailed(_) => "TASK_CREATE_FAILED",
            EngineError::Storage(_) => "STORAGE_ERROR",
            EngineError::FileTooLarge(_) => "FILE_TOO_LARGE",
        }
    }

    /// Whether this error reflects a client-side mistake (maps to HTTP 400)
    /// as opposed to a server-side condition (404/409/500).
    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::Core(_))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
