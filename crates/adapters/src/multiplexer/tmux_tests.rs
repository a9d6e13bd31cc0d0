// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::LazyLock;

/// Random prefix for this test run to avoid conflicts with parallel test runs.
static TEST_PREFIX: LazyLock<String> = LazyLock::new(|| {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    format!("t{:04x}", nanos & 0xFFFF)
});

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(0);

fn unique_name(suffix: &str) -> String {
    let id = SESSION_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}-{}", *TEST_PREFIX, suffix, id)
}

fn tmux_available() -> bool {
    std::process::Command::new("tmux")
        .arg("-V")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

macro_rules! fail_if_no_tmux {
    () => {
        if !tmux_available() {
            panic!("tmux is required but not available");
        }
    };
}

#[tokio::test]
#[serial(tmux)]
async fn create_root_pane_returns_session_scoped_target() {
    fail_if_no_tmux!();
    let adapter = TmuxMultiplexer::new();
    let name = unique_name("root");

    let pane = adapter
        .create_root_pane_in_dir(&name, Path::new("/tmp"))
        .await
        .unwrap();

    assert!(pane.pane_target.starts_with(&format!("ojp-{name}:")));
    assert!(!pane.pane_id.is_empty());

    let _ = adapter.close_pane(&pane.pane_target).await;
}

#[tokio::test]
#[serial(tmux)]
async fn create_sibling_pane_shares_session() {
    fail_if_no_tmux!();
    let adapter = TmuxMultiplexer::new();
    let name = unique_name("sibling");

    let root = adapter
        .create_root_pane_in_dir(&name, Path::new("/tmp"))
        .await
        .unwrap();
    let sibling = adapter
        .create_sibling_pane_in_dir(&root.pane_target, Path::new("/tmp"))
        .await
        .unwrap();

    let root_session = root.pane_target.split(':').next().unwrap();
    let sibling_session = sibling.pane_target.split(':').next().unwrap();
    assert_eq!(root_session, sibling_session);
    assert_ne!(root.pane_id, sibling.pane_id);
}

#[tokio::test]
#[serial(tmux)]
async fn send_input_to_nonexistent_pane_returns_not_found() {
    fail_if_no_tmux!();
    let adapter = TmuxMultiplexer::new();

    let result = adapter.send_input("nonexistent-session-xyz:0.0", "hi").await;
    assert!(matches!(result, Err(MultiplexerError::NotFound(_))));
}

#[tokio::test]
#[serial(tmux)]
async fn capture_history_returns_pane_content() {
    fail_if_no_tmux!();
    let adapter = TmuxMultiplexer::new();
    let name = unique_name("capture");

    let root = adapter
        .create_root_pane_in_dir(&name, Path::new("/tmp"))
        .await
        .unwrap();

    adapter
        .send_input(&root.pane_target, "echo capture-test-output")
        .await
        .unwrap();
    let mut cmd = tokio::process::Command::new("tmux");
    cmd.args(["send-keys", "-t", &root.pane_target, "Enter"]);
    let _ = cmd.output().await;

    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

    let output = adapter.capture_history(&root.pane_target, 200).await.unwrap();
    assert!(output.contains("capture-test-output"));

    let _ = adapter.close_pane(&root.pane_target).await;
}

#[tokio::test]
#[serial(tmux)]
async fn capture_history_nonexistent_pane_returns_not_found() {
    fail_if_no_tmux!();
    let adapter = TmuxMultiplexer::new();

    let result = adapter
        .capture_history("nonexistent-session-xyz:0.0", 200)
        .await;
    assert!(matches!(result, Err(MultiplexerError::NotFound(_))));
}

#[tokio::test]
#[serial(tmux)]
async fn current_command_is_best_effort_and_never_errs() {
    fail_if_no_tmux!();
    let adapter = TmuxMultiplexer::new();

    // Nonexistent pane: best-effort contract returns empty string, not an error.
    let value = adapter.current_command("nonexistent-session-xyz:0.0").await;
    assert_eq!(value, "");
}

#[tokio::test]
#[serial(tmux)]
async fn read_pane_option_value_times_out_when_unset() {
    fail_if_no_tmux!();
    let adapter = TmuxMultiplexer::new();
    let name = unique_name("opt");

    let root = adapter
        .create_root_pane_in_dir(&name, Path::new("/tmp"))
        .await
        .unwrap();

    let value = adapter
        .read_pane_option_value(&root.pane_target, "@shell_ready_never_set")
        .await
        .unwrap();
    assert_eq!(value, None);

    let _ = adapter.close_pane(&root.pane_target).await;
}
