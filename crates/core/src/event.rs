// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session events and the transition reducer.
//!
//! Every state change of a session goes through [`transition`], a pure
//! function of the current state and an event. The orchestrator applies
//! its result under the session's mutation lock.

use crate::app::AppOutcome;
use crate::state::SessionState;
use serde::{Deserialize, Serialize};

/// Something that happened to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A delayed session was asked to launch
    StartRequested,
    /// The engine reported the application id
    AppIdKnown,
    /// The application reported its final status
    Finished { outcome: AppOutcome },
    /// The launch could not be submitted
    LaunchFailed { reason: String },
    /// A caller asked for the application to be killed
    KillRequested,
}

crate::simple_display! {
    SessionEvent {
        StartRequested => "start_requested",
        AppIdKnown => "app_id_known",
        Finished { .. } => "finished",
        LaunchFailed { .. } => "launch_failed",
        KillRequested => "kill_requested",
    }
}

/// Result of applying an event to a state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Move to the given state
    Advance(SessionState),
    /// Event has no effect in this state (duplicate or stale notification)
    Ignore,
    /// Event is a request that is illegal in this state
    Reject(&'static str),
}

/// Compute the effect of `event` on a session in `current` state.
///
/// Terminal states absorb every notification; only an explicit start
/// request is rejected there, so callers can report it.
pub fn transition(current: &SessionState, event: &SessionEvent) -> Transition {
    use SessionState as S;

    if current.is_terminal() {
        return match event {
            SessionEvent::StartRequested => Transition::Reject("session has already finished"),
            _ => Transition::Ignore,
        };
    }

    match event {
        SessionEvent::StartRequested => match current {
            S::NotStarted => Transition::Advance(S::Starting),
            _ => Transition::Reject("only a session that has not started can be started"),
        },
        SessionEvent::AppIdKnown => match current {
            S::Starting | S::Recovering => Transition::Advance(S::Running),
            _ => Transition::Ignore,
        },
        SessionEvent::Finished { outcome } => Transition::Advance(outcome.terminal_state()),
        SessionEvent::LaunchFailed { reason } => Transition::Advance(S::Dead(reason.clone())),
        SessionEvent::KillRequested => Transition::Advance(S::Killed),
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
