// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ojp_core::CoreError;

#[test]
fn core_error_code_passes_through() {
    let err = EngineError::from(CoreError::InvalidPaneTarget);
    assert_eq!(err.code(), "INVALID_PANE_TARGET");
    assert!(err.is_validation());
}

#[test]
fn domain_error_codes_are_stable() {
    assert_eq!(
        EngineError::PaneAlreadyBound("e2e:0.9".to_string()).code(),
        "PANE_ALREADY_BOUND"
    );
    assert_eq!(
        EngineError::PlannerOnlySpawnExecutor.code(),
        "PLANNER_ONLY_SPAWN_EXECUTOR"
    );
    assert_eq!(EngineError::AgentLoopUnavailable.code(), "AGENT_LOOP_UNAVAILABLE");
    assert!(!EngineError::AgentLoopUnavailable.is_validation());
}
