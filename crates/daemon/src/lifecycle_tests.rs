// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use std::sync::Mutex as StdMutex;
use tempfile::tempdir;

static ENV_LOCK: StdMutex<()> = StdMutex::new(());

fn test_config(dir: &std::path::Path) -> Config {
    Config {
        state_dir: dir.join("state"),
        lock_path: dir.join("state").join("daemon.pid"),
        wal_path: dir.join("state").join("wal").join("events.jsonl"),
        snapshot_path: dir.join("state").join("snapshot.json"),
        config_dir: dir.join("config"),
        server_instance_id: "srv_test".to_string(),
        http_port: 0,
    }
}

#[test]
#[serial]
fn startup_builds_context_with_configured_server_instance_id() {
    let _lock = ENV_LOCK.lock().unwrap();
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());

    let result = startup(&config).expect("startup succeeds");
    assert_eq!(result.ctx.server_instance_id, "srv_test");
    assert!(config.lock_path.exists());
}

#[test]
#[serial]
fn startup_fails_when_lock_already_held() {
    let _lock = ENV_LOCK.lock().unwrap();
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());

    let first = startup(&config).expect("first startup succeeds");
    let second = startup(&config);
    assert!(matches!(second, Err(LifecycleError::LockFailed(_))));
    drop(first);
}

#[test]
#[serial]
fn startup_replays_state_from_an_existing_snapshot() {
    let _lock = ENV_LOCK.lock().unwrap();
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());

    let mut state = MaterializedState::default();
    state.projects.insert(
        "p1".to_string(),
        ojp_core::Project {
            project_id: ojp_core::ProjectId::new("p1"),
            repo_root: dir.path().to_path_buf(),
            display_name: "p1".to_string(),
            is_git_repo: false,
        },
    );
    Snapshot::new(0, state).save(&config.snapshot_path).unwrap();

    let result = startup(&config).expect("startup succeeds");
    assert!(result.ctx.state.lock().projects.contains_key("p1"));
}

#[test]
#[serial]
fn shutdown_removes_the_lock_file() {
    let _lock = ENV_LOCK.lock().unwrap();
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());

    let result = startup(&config).expect("startup succeeds");
    drop(result.lock_file);
    shutdown(&config);
    assert!(!config.lock_path.exists());
}
