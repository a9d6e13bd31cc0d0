// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-task agent-loop supervisor: strict FIFO and serial
//! execution per `task_id`, concurrent across tasks — one dispatcher per
//! entity, FIFO within it, parallel across entities.

use crate::context::EventPublisher;
use crate::error::EngineError;
use ojp_adapters::{AgentLoopRequest, AgentLoopRunner};
use ojp_core::{Clock, Event, MessageRole, MessageStatus};
use ojp_storage::{MaterializedState, Wal};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// One turn enqueued to a task's agent loop.
#[derive(Debug, Clone)]
pub struct SupervisorEvent {
    pub task_id: String,
    pub project_id: String,
    pub source: String,
    pub display_content: String,
    pub agent_prompt: String,
    pub trigger_meta: HashMap<String, String>,
    pub cancel: CancellationToken,
}

struct Worker {
    sender: mpsc::UnboundedSender<SupervisorEvent>,
}

struct SupervisorInner {
    state: Arc<Mutex<MaterializedState>>,
    wal: Arc<Mutex<Wal>>,
    clock: Arc<dyn Clock>,
    agent_loop: Option<Arc<dyn AgentLoopRunner>>,
    hub: Arc<dyn EventPublisher>,
    workers: Mutex<HashMap<String, Worker>>,
}

/// Cheaply clonable handle to the per-task dispatcher registry.
#[derive(Clone)]
pub struct Supervisor {
    inner: Arc<SupervisorInner>,
}

impl Supervisor {
    pub fn new(
        state: Arc<Mutex<MaterializedState>>,
        wal: Arc<Mutex<Wal>>,
        clock: Arc<dyn Clock>,
        agent_loop: Option<Arc<dyn AgentLoopRunner>>,
        hub: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            inner: Arc::new(SupervisorInner {
                state,
                wal,
                clock,
                agent_loop,
                hub,
                workers: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Enqueue a turn for `event.task_id`. Spawns a per-task worker loop on
    /// first use; subsequent enqueues for the same task join its FIFO queue.
    pub fn enqueue(&self, event: SupervisorEvent) -> Result<(), EngineError> {
        if self.inner.agent_loop.is_none() {
            return Err(EngineError::AgentLoopUnavailable);
        }

        let mut workers = self.inner.workers.lock();
        let sender = match workers.get(&event.task_id) {
            Some(worker) => worker.sender.clone(),
            None => {
                let (tx, rx) = mpsc::unbounded_channel();
                workers.insert(
                    event.task_id.clone(),
                    Worker { sender: tx.clone() },
                );
                let inner = Arc::clone(&self.inner);
                tokio::spawn(Self::run_worker(inner, rx));
                tx
            }
        };
        drop(workers);

        sender
            .send(event)
            .map_err(|_| EngineError::AgentLoopUnavailable)
    }

    async fn run_worker(inner: Arc<SupervisorInner>, mut rx: mpsc::UnboundedReceiver<SupervisorEvent>) {
        while let Some(event) = rx.recv().await {
            Self::process_one(&inner, event).await;
        }
    }

    async fn process_one(inner: &SupervisorInner, event: SupervisorEvent) {
        let now = inner.clock.epoch_secs();
        let user_seq = Self::next_seq(&inner.state, &event.task_id);
        let user_event = Event::TaskMessageAppended {
            task_id: event.task_id.clone().into(),
            seq: user_seq,
            role: MessageRole::User,
            content: event.display_content.clone(),
            created_at: now,
        };
        Self::emit(inner, user_event.clone());
        Self::emit(
            inner,
            Event::TaskMessageStatusChanged {
                task_id: event.task_id.clone().into(),
                seq: user_seq,
                status: MessageStatus::Completed,
                content: None,
                error: None,
            },
        );

        let assistant_seq = user_seq + 1;
        let assistant_event = Event::TaskMessageAppended {
            task_id: event.task_id.clone().into(),
            seq: assistant_seq,
            role: MessageRole::Assistant,
            content: String::new(),
            created_at: now,
        };
        Self::emit(inner, assistant_event);

        if event.cancel.is_cancelled() {
            Self::emit(
                inner,
                Event::TaskMessageStatusChanged {
                    task_id: event.task_id.clone().into(),
                    seq: assistant_seq,
                    status: MessageStatus::Failed,
                    content: None,
                    error: Some("canceled before dispatch".to_string()),
                },
            );
            return;
        }

        let Some(runner) = inner.agent_loop.as_ref() else {
            Self::emit(
                inner,
                Event::TaskMessageStatusChanged {
                    task_id: event.task_id.clone().into(),
                    seq: assistant_seq,
                    status: MessageStatus::Failed,
                    content: None,
                    error: Some("agent loop runner unavailable".to_string()),
                },
            );
            return;
        };

        let request = AgentLoopRequest {
            task_id: event.task_id.clone(),
            project_id: event.project_id.clone(),
            prompt: event.agent_prompt.clone(),
        };

        match runner.run(request).await {
            Ok(text) => {
                Self::emit(
                    inner,
                    Event::TaskMessageStatusChanged {
                        task_id: event.task_id.clone().into(),
                        seq: assistant_seq,
                        status: MessageStatus::Completed,
                        content: Some(text),
                        error: None,
                    },
                );
                inner.hub.publish(
                    "task.messages.updated",
                    &event.project_id,
                    &event.task_id,
                    serde_json::json!({"seq": assistant_seq}),
                );
            }
            Err(err) => {
                Self::emit(
                    inner,
                    Event::TaskMessageStatusChanged {
                        task_id: event.task_id.clone().into(),
                        seq: assistant_seq,
                        status: MessageStatus::Failed,
                        content: None,
                        error: Some(err.to_string()),
                    },
                );
            }
        }
    }

    fn next_seq(state: &Arc<Mutex<MaterializedState>>, task_id: &str) -> u64 {
        state
            .lock()
            .task_messages
            .get(task_id)
            .map(|msgs| msgs.len() as u64)
            .unwrap_or(0)
    }

    fn emit(inner: &SupervisorInner, event: Event) {
        let mut wal = inner.wal.lock();
        if let Err(err) = wal.append(&event) {
            tracing::warn!(error = %err, "failed to append supervisor event to wal");
            return;
        }
        if let Err(err) = wal.flush() {
            tracing::warn!(error = %err, "failed to flush wal after supervisor event");
        }
        drop(wal);
        inner.state.lock().apply_event(&event);
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
