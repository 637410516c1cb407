// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster application adapters
//!
//! The engine runs each batch job as an external application. A launcher
//! either submits a new application or re-attaches to one that is already
//! running, and from then on the application reports back through an
//! [`AppListener`]:
//!
//! ```text
//! launch/attach ──► app_id_known ──► info_changed* ──► finished (once)
//! ```
//!
//! Notifications arrive on the launcher's monitor task, concurrently with
//! anything the session is doing.

pub mod local;

pub use local::LocalLauncher;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeHandle, FakeLauncher, LauncherCall};

use async_trait::async_trait;
use bj_core::{AppInfo, AppOutcome, AppTag, LogBuffer, SessionId};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors from application adapter operations
#[derive(Debug, Error)]
pub enum AppError {
    #[error("application not found: {0}")]
    NotFound(String),
    #[error("launch failed: {0}")]
    LaunchFailed(String),
    #[error("kill failed: {0}")]
    KillFailed(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything needed to submit a new application
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    pub session_id: SessionId,
    pub app_tag: AppTag,
    /// Path or `file://` URI of the artifact
    pub artifact: String,
    pub args: Vec<String>,
    /// Engine configuration passed through to the application
    pub conf: BTreeMap<String, String>,
    pub name: Option<String>,
}

impl LaunchSpec {
    pub fn new(session_id: SessionId, app_tag: AppTag, artifact: impl Into<String>) -> Self {
        Self {
            session_id,
            app_tag,
            artifact: artifact.into(),
            args: Vec::new(),
            conf: BTreeMap::new(),
            name: None,
        }
    }

    bj_core::setters! {
        set {
            args: Vec<String>,
            conf: BTreeMap<String, String>,
        }
        option {
            name: String,
        }
    }
}

/// Identifies an application that is already running
#[derive(Debug, Clone)]
pub struct AttachSpec {
    pub session_id: SessionId,
    pub app_tag: AppTag,
    /// Application id from the recovery record, if it was known
    pub app_id: Option<String>,
}

/// Receives notifications from a running application.
///
/// `finished` is delivered once per application; the others may repeat.
pub trait AppListener: Send + Sync {
    fn app_id_known(&self, app_id: &str);

    fn info_changed(&self, info: &AppInfo);

    fn finished(&self, outcome: AppOutcome);
}

/// Live proxy to an external application
#[async_trait]
pub trait AppHandle: Send + Sync {
    fn app_tag(&self) -> &AppTag;

    /// Ask the engine to kill the application.
    ///
    /// Returns `false` if the application had already finished and nothing
    /// was signalled. Either way the application still reports `finished`
    /// through its listener.
    async fn kill(&self) -> Result<bool, AppError>;
}

/// Factory for application handles
#[async_trait]
pub trait AppLauncher: Send + Sync + 'static {
    /// Submit a new application.
    ///
    /// `listener` is registered before the application starts, so no
    /// notification can be missed. Output lines go to `log`.
    async fn launch(
        &self,
        spec: LaunchSpec,
        listener: Arc<dyn AppListener>,
        log: Arc<LogBuffer>,
    ) -> Result<Arc<dyn AppHandle>, AppError>;

    /// Re-attach to an application launched by an earlier process.
    ///
    /// Does not start anything. An application that has already finished
    /// reports `finished` right away.
    async fn attach(
        &self,
        spec: AttachSpec,
        listener: Arc<dyn AppListener>,
        log: Arc<LogBuffer>,
    ) -> Result<Arc<dyn AppHandle>, AppError>;
}
