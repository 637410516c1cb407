// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for the external cluster engine and artifact staging

pub mod app;
pub mod upload;

pub use app::{
    AppError, AppHandle, AppLauncher, AppListener, AttachSpec, LaunchSpec, LocalLauncher,
};
pub use upload::{LocalStager, UploadError};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use app::{FakeHandle, FakeLauncher, LauncherCall};
