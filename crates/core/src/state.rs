// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Metadata captured when an application finishes successfully.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

/// State of a batch session.
///
/// `NotStarted`, `Starting`, `Recovering` and `Running` are active; the
/// remaining three are terminal and never change once entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Delayed session waiting for its artifact
    NotStarted,
    /// Launch requested, application not confirmed yet
    Starting,
    /// Rebuilt from a recovery record, waiting for the application to report
    Recovering,
    /// Application confirmed by the engine
    Running,
    /// Application finished successfully
    Success(ExitMetadata),
    /// Launch or application failed
    Dead(String),
    /// Application was killed
    Killed,
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SessionState::NotStarted
                | SessionState::Starting
                | SessionState::Recovering
                | SessionState::Running
        )
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    pub fn kind(&self) -> SessionStateKind {
        SessionStateKind::from(self)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Dead(reason) if !reason.is_empty() => write!(f, "dead: {}", reason),
            other => write!(f, "{}", other.kind()),
        }
    }
}

/// Tag-only variant of [`SessionState`] (strips associated data).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStateKind {
    NotStarted,
    Starting,
    Recovering,
    Running,
    Success,
    Dead,
    Killed,
}

impl From<&SessionState> for SessionStateKind {
    fn from(s: &SessionState) -> Self {
        match s {
            SessionState::NotStarted => SessionStateKind::NotStarted,
            SessionState::Starting => SessionStateKind::Starting,
            SessionState::Recovering => SessionStateKind::Recovering,
            SessionState::Running => SessionStateKind::Running,
            SessionState::Success(_) => SessionStateKind::Success,
            SessionState::Dead(_) => SessionStateKind::Dead,
            SessionState::Killed => SessionStateKind::Killed,
        }
    }
}

crate::simple_display! {
    SessionStateKind {
        NotStarted => "not_started",
        Starting => "starting",
        Recovering => "recovering",
        Running => "running",
        Success => "success",
        Dead => "dead",
        Killed => "killed",
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
