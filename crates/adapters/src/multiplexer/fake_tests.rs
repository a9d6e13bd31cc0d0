// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::Path;

#[tokio::test]
async fn create_root_mints_distinct_panes() {
    let adapter = FakeMultiplexer::new();
    let a = adapter
        .create_root_pane_in_dir("t_a", Path::new("/tmp/a"))
        .await
        .unwrap();
    let b = adapter
        .create_root_pane_in_dir("t_b", Path::new("/tmp/b"))
        .await
        .unwrap();
    assert_ne!(a.pane_target, b.pane_target);
    assert_ne!(a.pane_id, b.pane_id);
}

#[tokio::test]
async fn send_input_to_unknown_target_is_not_found() {
    let adapter = FakeMultiplexer::new();
    let result = adapter.send_input("nope:0.0", "hi").await;
    assert!(matches!(result, Err(MultiplexerError::NotFound(_))));
}

#[tokio::test]
async fn send_input_to_created_pane_succeeds() {
    let adapter = FakeMultiplexer::new();
    let pane = adapter
        .create_root_pane_in_dir("t_a", Path::new("/tmp"))
        .await
        .unwrap();
    adapter.send_input(&pane.pane_target, "hello").await.unwrap();
}

#[tokio::test]
async fn seeded_option_value_is_returned() {
    let adapter = FakeMultiplexer::new();
    adapter.seed_pane_option("s:0.0", "@shell_ready", "1");
    let value = adapter
        .read_pane_option_value("s:0.0", "@shell_ready")
        .await
        .unwrap();
    assert_eq!(value.as_deref(), Some("1"));
}

#[tokio::test]
async fn unseeded_option_value_is_none() {
    let adapter = FakeMultiplexer::new();
    let value = adapter
        .read_pane_option_value("s:0.0", "@shell_ready")
        .await
        .unwrap();
    assert_eq!(value, None);
}

#[tokio::test]
async fn close_pane_removes_it_from_known_panes() {
    let adapter = FakeMultiplexer::new();
    let pane = adapter
        .create_root_pane_in_dir("t_a", Path::new("/tmp"))
        .await
        .unwrap();
    adapter.close_pane(&pane.pane_target).await.unwrap();
    let result = adapter.send_input(&pane.pane_target, "hi").await;
    assert!(matches!(result, Err(MultiplexerError::NotFound(_))));
}

#[tokio::test]
async fn calls_are_recorded_in_order() {
    let adapter = FakeMultiplexer::new();
    let pane = adapter
        .create_root_pane_in_dir("t_a", Path::new("/tmp"))
        .await
        .unwrap();
    let _ = adapter.current_command(&pane.pane_target).await;
    let calls = adapter.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[0], MultiplexerCall::CreateRoot { .. }));
    assert!(matches!(calls[1], MultiplexerCall::CurrentCommand { .. }));
}
