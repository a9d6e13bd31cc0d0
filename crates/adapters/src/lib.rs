// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: the terminal multiplexer, desktop
//! notifications, the completion-command shell, and the agent-loop runner.

pub mod agent_loop;
pub mod multiplexer;
pub mod notify;
pub mod shell;
pub mod subprocess;

pub use agent_loop::{AgentLoopError, AgentLoopRequest, AgentLoopRunner};
pub use multiplexer::{CreatedPane, MultiplexerAdapter, MultiplexerError, TmuxMultiplexer};
pub use notify::{DesktopNotifyAdapter, NoOpNotifyAdapter, NotifyAdapter};
pub use shell::{RealShellRunner, ShellError, ShellRunner};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use agent_loop::FakeAgentLoopRunner;
#[cfg(any(test, feature = "test-support"))]
pub use multiplexer::{FakeMultiplexer, MultiplexerCall};
#[cfg(any(test, feature = "test-support"))]
pub use notify::{FakeNotifyAdapter, NotifyCall};
#[cfg(any(test, feature = "test-support"))]
pub use shell::{FakeShellRunner, ShellCall};
