// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bj-engine: batch session orchestration, registry and configuration

pub mod config;
pub mod env;
mod error;
mod manager;
mod session;

pub use config::{ConfigError, EngineConfig, DEFAULT_POLL_INTERVAL};
pub use error::SessionError;
pub use manager::SessionManager;
pub use session::BatchSession;
