// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bj-storage: durable recovery records for batch sessions

mod file;
#[cfg(any(test, feature = "test-support"))]
mod memory;
mod store;

pub use file::FileSessionStore;
#[cfg(any(test, feature = "test-support"))]
pub use memory::{MemorySessionStore, SaveCall};
pub use store::{SessionStore, StoreError};
