// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the engine crate.

use std::path::PathBuf;
use std::time::Duration;

/// Resolve state directory: BJ_STATE_DIR > XDG_STATE_HOME/bj > ~/.local/state/bj
pub fn state_dir() -> Option<PathBuf> {
    if let Some(dir) = non_empty("BJ_STATE_DIR") {
        return Some(PathBuf::from(dir));
    }
    if let Some(xdg) = non_empty("XDG_STATE_HOME") {
        return Some(PathBuf::from(xdg).join("bj"));
    }
    dirs::home_dir().map(|home| home.join(".local/state/bj"))
}

/// Log buffer capacity override
pub fn log_capacity() -> Option<usize> {
    non_empty("BJ_LOG_CAPACITY").and_then(|s| s.parse::<usize>().ok())
}

/// Monitor poll interval override
pub fn poll_interval() -> Option<Duration> {
    non_empty("BJ_POLL_MS").and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}

/// Owner override for new sessions
pub fn owner() -> Option<String> {
    non_empty("BJ_OWNER")
}

/// Login name of the current user, used as the default owner.
pub fn login_name() -> String {
    non_empty("USER").or_else(|| non_empty("LOGNAME")).unwrap_or_else(|| "unknown".to_string())
}

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}
