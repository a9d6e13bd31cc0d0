// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared axum state: the engine context plus the server-level config the
//! `GET/PATCH /api/v1/config` endpoints read and write.

use crate::hub::Hub;
use ojp_engine::EngineContext;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Server-level configuration exposed through `/api/v1/config`: local
/// port, helper-program, notify-command, helper OpenAI config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    #[serde(default)]
    pub helper_program: String,
    #[serde(default)]
    pub notify_command: String,
    #[serde(default)]
    pub helper_openai_base_url: String,
    #[serde(default)]
    pub helper_openai_model: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 0,
            helper_program: String::new(),
            notify_command: String::new(),
            helper_openai_base_url: String::new(),
            helper_openai_model: String::new(),
        }
    }
}

/// Partial update body for `PATCH /api/v1/config`; absent fields are left
/// untouched, matching the `UpsertTaskMeta`-style partial-update
/// discipline used for task metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfigPatch {
    pub port: Option<u16>,
    pub helper_program: Option<String>,
    pub notify_command: Option<String>,
    pub helper_openai_base_url: Option<String>,
    pub helper_openai_model: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<EngineContext>,
    pub hub: Hub,
    pub config: Arc<RwLock<ServerConfig>>,
}
