// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command handlers.

pub mod kill;
pub mod list;
pub mod recover;
pub mod submit;

use crate::exit_error::ExitError;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use bj_core::{SessionState, SessionStateKind};
use bj_engine::BatchSession;
use clap::Args;
use std::time::{Duration, Instant};

/// How long to wait for a launch or re-attach to report back.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Lines of output shown after a waited-on session finishes.
const LOG_TAIL: usize = 20;

#[derive(Args, Debug, Clone, Default)]
pub struct WaitArgs {
    /// Wait for the session to finish and print its final state
    #[arg(long)]
    pub wait: bool,

    /// Give up waiting after this many seconds
    #[arg(long, value_name = "SECS", requires = "wait")]
    pub timeout: Option<u64>,
}

impl WaitArgs {
    fn deadline(&self) -> Option<Instant> {
        self.timeout.map(|secs| Instant::now() + Duration::from_secs(secs))
    }
}

/// Wait until the session leaves `transient`.
///
/// The launch and re-attach run in the background; a command must not exit
/// before they have reported, or the work is lost with the runtime.
pub async fn settle(session: &BatchSession, transient: SessionStateKind) {
    let mut rx = session.subscribe();
    let left = tokio::time::timeout(SETTLE_TIMEOUT, rx.wait_for(|s| s.kind() != transient))
        .await
        .is_ok_and(|r| r.is_ok());
    if !left {
        tracing::warn!(session_id = %session.id(), state = %transient, "session did not settle");
    }
}

/// Wait for each session to finish and report it.
///
/// Fails with exit code 1 if any session did not succeed, 2 on timeout.
pub async fn finish_all(sessions: &[BatchSession], wait: &WaitArgs, format: OutputFormat) -> Result<()> {
    let deadline = wait.deadline();
    let mut failed = None;

    for session in sessions {
        let limit = deadline.map(|d| d.saturating_duration_since(Instant::now()));
        let Some(state) = session.wait_until_inactive(limit).await else {
            return Err(ExitError::timed_out(&format!("session {}", session.id())).into());
        };
        report(session, &state, format)?;
        if !matches!(state, SessionState::Success(_)) && failed.is_none() {
            failed = Some(state);
        }
    }

    match failed {
        Some(state) => Err(ExitError::unsuccessful(&state).into()),
        None => Ok(()),
    }
}

/// Print a session's state, plus its output tail once it has finished.
pub fn report(session: &BatchSession, state: &SessionState, format: OutputFormat) -> Result<()> {
    let log = if state.is_terminal() { tail(session.log_lines()) } else { Vec::new() };
    match format {
        OutputFormat::Text => {
            println!("{}", output::state_line(session.id(), state));
            for line in &log {
                println!("  {}", line);
            }
        }
        OutputFormat::Json => {
            let value = output::session_json(&session.to_metadata(), state, &log);
            println!("{}", serde_json::to_string(&value)?);
        }
    }
    Ok(())
}

fn tail(mut lines: Vec<String>) -> Vec<String> {
    let skip = lines.len().saturating_sub(LOG_TAIL);
    lines.drain(..skip);
    lines
}
