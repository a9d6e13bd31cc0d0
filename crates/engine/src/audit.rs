// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Audit log: one structured JSON line per completion
//! decision stage. A direct specialization of a generic
//! `ActivityLogger<K>` down to the single set of kinds used here —
//! `trigger.received` / `trigger.enqueued` / `trigger.skipped` — so the
//! generic `LogKind` machinery isn't needed.

use ojp_core::format_utc_now;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Decision stage recorded for a single `AutoCompleteByPane` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditStage {
    Received,
    Enqueued,
    Skipped,
}

impl AuditStage {
    fn as_str(&self) -> &'static str {
        match self {
            AuditStage::Received => "trigger.received",
            AuditStage::Enqueued => "trigger.enqueued",
            AuditStage::Skipped => "trigger.skipped",
        }
    }
}

/// Append-only audit logger. Every call independently opens, writes, and
/// closes the file so a crashed process never corrupts a prior line.
pub struct AutopilotLogger {
    path: PathBuf,
}

impl AutopilotLogger {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Write one decision-stage line.
    pub fn log(
        &self,
        stage: AuditStage,
        project_id: &str,
        task_id: &str,
        reason: Option<&str>,
        request_meta: &HashMap<String, String>,
    ) {
        let line = serde_json::json!({
            "ts": format_utc_now(),
            "stage": stage.as_str(),
            "project_id": project_id,
            "task_id": task_id,
            "reason": reason,
            "request_meta": request_meta,
        })
        .to_string();

        if let Some(parent) = self.path.parent() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                tracing::warn!(error = %err, path = %self.path.display(), "failed to create audit log directory");
                return;
            }
        }

        match OpenOptions::new().create(true).append(true).open(&self.path) {
            Ok(mut file) => {
                if let Err(err) = writeln!(file, "{line}") {
                    tracing::warn!(error = %err, "failed to write audit log line");
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, path = %self.path.display(), "failed to open audit log");
            }
        }
    }
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
