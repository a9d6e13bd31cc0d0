// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_run_starts_running() {
    let r = Run::new(RunId::new("r_1"), TaskId::new("t_1"), 10);
    assert_eq!(r.run_status, RunStatus::Running);
}

#[test]
fn mark_stale_sets_reason() {
    let mut b = RunBinding::new_live(
        RunId::new("r_1"),
        "srv_old".to_string(),
        "%1".to_string(),
        "e2e:1.1".to_string(),
    );
    assert_eq!(b.binding_status, BindingStatus::Live);
    b.mark_stale("tmux_restarted");
    assert_eq!(b.binding_status, BindingStatus::Stale);
    assert_eq!(b.stale_reason.as_deref(), Some("tmux_restarted"));
}

#[test]
fn run_status_display() {
    assert_eq!(RunStatus::NeedsRebind.to_string(), "needs_rebind");
}
