// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project identifier and the minimal project record the core stores.
//!
//! Projects themselves are registered externally (spec: "lifecycle lies
//! outside the core"); the core only needs a stable id, the repo root used
//! to resolve on-disk paths (`tasks/`, `returns/`, sidecar docs), and a
//! display name for audit lines and prompts.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

crate::define_id! {
    /// Unique, externally-assigned identifier for a registered project.
    pub struct ProjectId;
}

/// A registered project, as the core knows it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub project_id: ProjectId,
    pub repo_root: PathBuf,
    pub display_name: String,
    pub is_git_repo: bool,
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
