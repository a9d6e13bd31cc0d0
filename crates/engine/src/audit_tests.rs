// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn read_lines(path: &std::path::Path) -> Vec<serde_json::Value> {
    std::fs::read_to_string(path)
        .expect("read log")
        .lines()
        .map(|l| serde_json::from_str(l).expect("valid json line"))
        .collect()
}

#[test]
fn log_creates_parent_dirs_and_appends() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("audit.log");
    let logger = AutopilotLogger::new(path.clone());

    logger.log(AuditStage::Received, "proj1", "t_1", None, &HashMap::new());
    logger.log(
        AuditStage::Skipped,
        "proj1",
        "t_1",
        Some("autopilot disabled"),
        &HashMap::new(),
    );

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["stage"], "trigger.received");
    assert_eq!(lines[0]["task_id"], "t_1");
    assert!(lines[0]["reason"].is_null());
    assert_eq!(lines[1]["stage"], "trigger.skipped");
    assert_eq!(lines[1]["reason"], "autopilot disabled");
}

#[test]
fn log_carries_request_meta() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("audit.log");
    let logger = AutopilotLogger::new(path.clone());

    let mut meta = HashMap::new();
    meta.insert("trigger_source".to_string(), "pane-actor".to_string());
    logger.log(AuditStage::Enqueued, "proj1", "t_1", None, &meta);

    let lines = read_lines(&path);
    assert_eq!(lines[0]["request_meta"]["trigger_source"], "pane-actor");
}
