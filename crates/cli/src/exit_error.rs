// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! so `main()` can flush logs before terminating.

use bj_core::SessionState;
use std::fmt;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    /// A waited-on session ended in something other than success.
    pub fn unsuccessful(state: &SessionState) -> Self {
        Self::new(1, format!("session ended {}", state))
    }

    /// A wait gave up before the session finished.
    pub fn timed_out(what: &str) -> Self {
        Self::new(2, format!("timed out waiting for {}", what))
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}
