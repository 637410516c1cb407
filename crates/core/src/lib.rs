// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bj-core: session state machine, recovery records and log buffer for
//! the batch session manager.

pub mod macros;

pub mod app;
pub mod event;
pub mod id;
pub mod log_buffer;
pub mod record;
pub mod request;
pub mod state;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use app::{AppInfo, AppOutcome};
pub use event::{transition, SessionEvent, Transition};
pub use id::{AppTag, SessionId};
pub use log_buffer::{LogBuffer, DEFAULT_LOG_CAPACITY};
pub use record::{RecoveryMetadata, BATCH_SESSION_TYPE, CURRENT_RECORD_VERSION};
pub use request::{BatchRequest, RequestError, StartMode};
pub use state::{ExitMetadata, SessionState, SessionStateKind};
