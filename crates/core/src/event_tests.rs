// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::task::TaskStatus;

#[test]
fn topic_maps_events_to_pubsub_topics() {
    let e = Event::TaskStatusChanged {
        task_id: TaskId::new("t_1"),
        status: TaskStatus::Completed,
        at: 0,
    };
    assert_eq!(e.topic(), "task.status.updated");

    let e = Event::PaneCreated {
        task_id: TaskId::new("t_1"),
        pane_uuid: PaneUuid::new("pu_1"),
        pane_id: "%1".to_string(),
        pane_target: "e2e:1.1".to_string(),
    };
    assert_eq!(e.topic(), "pane.created");

    let e = Event::TaskReturnReported {
        task_id: TaskId::new("t_1"),
        run_id: None,
        summary: "done".to_string(),
    };
    assert_eq!(e.topic(), "task.return.reported");
}

#[test]
fn task_id_extracted_when_present() {
    let e = Event::TaskArchived {
        task_id: TaskId::new("t_9"),
    };
    assert_eq!(e.task_id(), Some(&TaskId::new("t_9")));
}

#[test]
fn unknown_wire_variant_deserializes_to_custom() {
    let json = r#"{"type":"some:future:event","foo":"bar"}"#;
    let e: Event = serde_json::from_str(json).unwrap();
    assert!(matches!(e, Event::Custom));
}
