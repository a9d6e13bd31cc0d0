// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn format_time_ago_zero_is_dash() {
    assert_eq!(format_time_ago(0), "-");
}

#[test]
fn format_time_ago_seconds() {
    let now_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64;
    let ago = format_time_ago(now_ms - 5_000);
    assert_eq!(ago, "5s");
}

#[test]
fn format_time_ago_minutes() {
    let now_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64;
    let ago = format_time_ago(now_ms - 2 * 60_000);
    assert_eq!(ago, "2m");
}

#[test]
fn print_json_roundtrips_a_value() {
    let value = serde_json::json!({"ok": true, "data": {"id": "t1"}});
    assert!(print_json(&value).is_ok());
}
