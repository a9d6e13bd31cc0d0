// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use crate::lifecycle::LifecycleError;
use std::path::PathBuf;

/// Resolve state directory: `OJP_STATE_DIR` > `XDG_STATE_HOME/ojp` >
/// `~/.local/state/ojp`.
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("OJP_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("ojp"));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/ojp"))
}

/// Identity for run-binding staleness; falls back to
/// `srv_local` when unset.
pub fn server_instance_id() -> String {
    std::env::var("SERVER_INSTANCE_ID").unwrap_or_else(|_| "srv_local".to_string())
}

/// Forwarded to the multiplexer adapter.
pub fn tmux_socket() -> Option<String> {
    std::env::var("TMUX_SOCKET").ok()
}

/// Global config base; skills, the sidecar doc, and the audit log all live
/// under it.
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("ojp");
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".config/ojp")
}

/// Local HTTP port override (the `GET/PATCH /api/v1/config`
/// "local port" setting); 0 lets the OS assign an ephemeral port.
pub fn http_port() -> u16 {
    std::env::var("OJP_PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(4490)
}
