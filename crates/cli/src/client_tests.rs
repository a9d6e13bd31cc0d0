// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use tempfile::tempdir;

#[test]
#[serial]
fn connect_fails_when_no_daemon_is_running() {
    let dir = tempdir().unwrap();
    std::env::set_var("OJP_STATE_DIR", dir.path());
    let result = DaemonClient::connect();
    assert!(matches!(result, Err(ClientError::DaemonNotRunning)));
    std::env::remove_var("OJP_STATE_DIR");
}

#[test]
fn timeouts_fall_back_to_sensible_defaults() {
    std::env::remove_var("OJP_TIMEOUT_IPC_MS");
    assert_eq!(timeout_ipc(), Duration::from_secs(5));
    assert_eq!(timeout_connect(), Duration::from_secs(5));
    assert_eq!(timeout_exit(), Duration::from_secs(2));
    assert_eq!(poll_interval(), Duration::from_millis(50));
}
