// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn pm_session_roundtrips_through_json() {
    let s = PMSession::new(
        PMSessionId::new("pm_1"),
        ProjectId::new("p1"),
        "Kickoff".to_string(),
        100,
    );
    let json = serde_json::to_string(&s).unwrap();
    let back: PMSession = serde_json::from_str(&json).unwrap();
    assert_eq!(back.pm_session_id, s.pm_session_id);
    assert_eq!(back.created_at, 100);
    assert_eq!(back.last_modified, 100);
}

#[test]
fn pm_message_role_serializes_snake_case() {
    let json = serde_json::to_string(&PMMessageRole::Assistant).unwrap();
    assert_eq!(json, "\"assistant\"");
}
