// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Types reported by the external cluster application.

use crate::state::{ExitMetadata, SessionState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Links published by a running application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_log_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_url: Option<String>,
}

impl AppInfo {
    pub fn new(driver_log_url: Option<String>, ui_url: Option<String>) -> Self {
        Self { driver_log_url, ui_url }
    }

    pub fn is_empty(&self) -> bool {
        non_empty(&self.driver_log_url).is_none() && non_empty(&self.ui_url).is_none()
    }

    /// Merge `update` into `self`, field by field.
    ///
    /// Only non-empty values in `update` overwrite. Returns true if any
    /// field changed.
    pub fn merge(&mut self, update: &AppInfo) -> bool {
        let mut changed = false;
        for (slot, value) in [
            (&mut self.driver_log_url, &update.driver_log_url),
            (&mut self.ui_url, &update.ui_url),
        ] {
            if let Some(v) = non_empty(value) {
                if slot.as_deref() != Some(v) {
                    *slot = Some(v.to_string());
                    changed = true;
                }
            }
        }
        changed
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Final status of an application, reported exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppOutcome {
    Success { exit_code: Option<i32> },
    Failure(String),
    Killed,
}

impl AppOutcome {
    /// The terminal session state this outcome drives a session into.
    pub fn terminal_state(&self) -> SessionState {
        match self {
            AppOutcome::Success { exit_code } => {
                SessionState::Success(ExitMetadata { exit_code: *exit_code })
            }
            AppOutcome::Failure(reason) => SessionState::Dead(reason.clone()),
            AppOutcome::Killed => SessionState::Killed,
        }
    }
}

impl fmt::Display for AppOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppOutcome::Success { exit_code: Some(code) } => write!(f, "success (exit code {})", code),
            AppOutcome::Success { exit_code: None } => write!(f, "success"),
            AppOutcome::Failure(reason) => write!(f, "failed: {}", reason),
            AppOutcome::Killed => write!(f, "killed"),
        }
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
