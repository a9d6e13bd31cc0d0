// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Engine for the task/pane/run agent-orchestration control plane: the
//! lifecycle services, the agent-loop supervisor, the prompt assembler, and
//! the autopilot completion engine all reach for state and adapters through
//! a single [`context::EngineContext`].

pub mod audit;
pub mod autopilot;
pub mod context;
pub mod error;
pub mod log_paths;
pub mod messages;
pub mod panes;
pub mod prompt;
pub mod runs;
pub mod supervisor;
pub mod tasks;

pub use audit::{AuditStage, AutopilotLogger};
pub use context::{EngineContext, EventPublisher, IdSource, NullPublisher, Notifier};
pub use error::EngineError;
pub use messages::{MessagePostOutcome, MessageRequest, MessageSource};
pub use prompt::PromptCaches;
pub use runs::ResumeOutcome;
pub use supervisor::{Supervisor, SupervisorEvent};
pub use tasks::TaskTreeNode;

#[cfg(any(test, feature = "test-support"))]
pub use context::TestContext;
