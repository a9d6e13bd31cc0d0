// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pub/sub hub: topic-tagged fan-out to connected WebSocket
//! subscribers, with an optional external sink mirror.
//!
//! A `broadcast::Sender` fan-out subscribers pull from independently.
//! There is no per-session cache or backfill: subscribers only
//! ever see events published after they connect.

use ojp_engine::EventPublisher;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// The protocol envelope delivered to WebSocket subscribers, per §6:
/// `{type:"event", op:topic, data:{project_id, task_id, payload}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubEvent {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub op: String,
    pub data: HubEventData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubEventData {
    pub project_id: String,
    pub task_id: String,
    pub payload: serde_json::Value,
}

/// An external mirror sink. A publish is mirrored with a deep copy of the
/// payload so the sink cannot observe mutations subscribers make to theirs.
pub trait ExternalSink: Send + Sync {
    fn mirror(&self, event: &HubEvent);
}

const CHANNEL_CAPACITY: usize = 1024;

/// Fan-out hub. Cheap to clone; all clones share the same broadcast channel.
#[derive(Clone)]
pub struct Hub {
    tx: broadcast::Sender<HubEvent>,
    sink: Option<std::sync::Arc<dyn ExternalSink>>,
}

impl Hub {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx, sink: None }
    }

    pub fn with_sink(sink: std::sync::Arc<dyn ExternalSink>) -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx, sink: Some(sink) }
    }

    /// Subscribe to the event stream. Lagging subscribers miss events rather
    /// than blocking publishers; `http::ws` handles `RecvError::Lagged` by
    /// skipping ahead.
    pub fn subscribe(&self) -> broadcast::Receiver<HubEvent> {
        self.tx.subscribe()
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for Hub {
    fn publish(&self, topic: &str, project_id: &str, task_id: &str, payload: serde_json::Value) {
        let event = HubEvent {
            kind: "event",
            op: topic.to_string(),
            data: HubEventData {
                project_id: project_id.to_string(),
                task_id: task_id.to_string(),
                payload,
            },
        };
        if let Some(sink) = &self.sink {
            sink.mirror(&event);
        }
        // No subscribers is the common case between WS connections; a send
        // error just means nobody is listening right now.
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct RecordingSink {
        received: Mutex<Vec<HubEvent>>,
    }

    impl ExternalSink for RecordingSink {
        fn mirror(&self, event: &HubEvent) {
            self.received.lock().unwrap().push(event.clone());
        }
    }

    #[tokio::test]
    async fn publish_delivers_to_subscribers_in_order() {
        let hub = Hub::new();
        let mut rx = hub.subscribe();

        hub.publish("task.status.updated", "p1", "t1", serde_json::json!({"status": "running"}));
        hub.publish("task.status.updated", "p1", "t1", serde_json::json!({"status": "done"}));

        let first = rx.recv().await.expect("first event");
        let second = rx.recv().await.expect("second event");
        assert_eq!(first.data.payload["status"], "running");
        assert_eq!(second.data.payload["status"], "done");
        assert_eq!(first.op, "task.status.updated");
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_does_not_error() {
        let hub = Hub::new();
        hub.publish("pane.created", "p1", "t1", serde_json::json!({}));
    }

    #[tokio::test]
    async fn publish_mirrors_a_deep_copy_to_the_external_sink() {
        let sink = Arc::new(RecordingSink { received: Mutex::new(Vec::new()) });
        let hub = Hub::with_sink(sink.clone());
        let mut payload = serde_json::json!({"count": 1});

        hub.publish("task.flag.updated", "p1", "t1", payload.clone());
        payload["count"] = serde_json::json!(2);

        let received = sink.received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].data.payload["count"], 1);
    }

    #[tokio::test]
    async fn late_subscriber_does_not_see_earlier_events() {
        let hub = Hub::new();
        hub.publish("task.status.updated", "p1", "t1", serde_json::json!({"status": "running"}));
        let mut rx = hub.subscribe();
        hub.publish("task.status.updated", "p1", "t1", serde_json::json!({"status": "done"}));

        let event = rx.recv().await.expect("only the later event");
        assert_eq!(event.data.payload["status"], "done");
    }
}
