// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent-loop runner: the external LLM collaborator the per-task supervisor
//! dispatches assembled prompts to. Out of core scope —
//! the core only depends on this trait, never a concrete backend.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentLoopError {
    #[error("agent run failed: {0}")]
    Failed(String),
}

/// One turn dispatched to the agent loop for a given task.
#[derive(Debug, Clone)]
pub struct AgentLoopRequest {
    pub task_id: String,
    pub project_id: String,
    pub prompt: String,
}

/// Injected collaborator that actually runs an LLM turn. The supervisor
/// holds `Option<Arc<dyn AgentLoopRunner>>`; when absent,
/// `Enqueue` fails closed with `EngineError::AgentLoopUnavailable`.
#[async_trait]
pub trait AgentLoopRunner: Send + Sync + 'static {
    /// Run one turn and return the assistant's response text.
    async fn run(&self, request: AgentLoopRequest) -> Result<String, AgentLoopError>;
}

/// Scripted `AgentLoopRunner` for tests: returns queued responses in order,
/// or a fixed error once the queue is drained (configurable).
#[derive(Clone)]
pub struct FakeAgentLoopRunner {
    state: Arc<Mutex<FakeState>>,
}

struct FakeState {
    responses: VecDeque<Result<String, String>>,
    calls: Vec<AgentLoopRequest>,
}

impl Default for FakeAgentLoopRunner {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                responses: VecDeque::new(),
                calls: Vec::new(),
            })),
        }
    }
}

impl FakeAgentLoopRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, text: impl Into<String>) {
        self.state.lock().responses.push_back(Ok(text.into()));
    }

    pub fn push_error(&self, message: impl Into<String>) {
        self.state.lock().responses.push_back(Err(message.into()));
    }

    pub fn calls(&self) -> Vec<AgentLoopRequest> {
        self.state.lock().calls.clone()
    }
}

#[async_trait]
impl AgentLoopRunner for FakeAgentLoopRunner {
    async fn run(&self, request: AgentLoopRequest) -> Result<String, AgentLoopError> {
        let mut state = self.state.lock();
        state.calls.push(request);
        match state.responses.pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(AgentLoopError::Failed(message)),
            None => Ok(String::new()),
        }
    }
}

#[cfg(test)]
#[path = "agent_loop_tests.rs"]
mod tests;
