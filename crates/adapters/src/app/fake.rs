// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake launcher for testing

#![cfg_attr(coverage_nightly, coverage(off))]

use super::{AppError, AppHandle, AppLauncher, AppListener, AttachSpec, LaunchSpec};
use async_trait::async_trait;
use bj_core::{AppTag, LogBuffer};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Recorded launcher call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LauncherCall {
    Launch { app_tag: AppTag, artifact: String, args: Vec<String> },
    Attach { app_tag: AppTag, app_id: Option<String> },
    Kill { app_tag: AppTag },
}

#[derive(Default)]
struct FakeLauncherState {
    calls: Vec<LauncherCall>,
    listeners: HashMap<AppTag, Arc<dyn AppListener>>,
    logs: HashMap<AppTag, Arc<LogBuffer>>,
    launch_error: Option<String>,
    attach_missing: bool,
    /// Handles report the application as already finished
    exited: bool,
}

/// Fake launcher that records calls and hands listeners back to tests.
///
/// Nothing is reported on its own; tests drive notifications through
/// [`FakeLauncher::listener`].
#[derive(Clone, Default)]
pub struct FakeLauncher {
    inner: Arc<Mutex<FakeLauncherState>>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<LauncherCall> {
        self.inner.lock().calls.clone()
    }

    pub fn launch_count(&self) -> usize {
        self.inner.lock().calls.iter().filter(|c| matches!(c, LauncherCall::Launch { .. })).count()
    }

    /// Listener registered for `tag` by the last launch or attach
    pub fn listener(&self, tag: &AppTag) -> Option<Arc<dyn AppListener>> {
        self.inner.lock().listeners.get(tag).cloned()
    }

    /// Log buffer handed over for `tag`
    pub fn log(&self, tag: &AppTag) -> Option<Arc<LogBuffer>> {
        self.inner.lock().logs.get(tag).cloned()
    }

    /// Make launches fail with `reason` (or succeed again with `None`)
    pub fn fail_launches(&self, reason: Option<&str>) {
        self.inner.lock().launch_error = reason.map(String::from);
    }

    /// Make attaches fail with `NotFound`
    pub fn fail_attaches(&self, missing: bool) {
        self.inner.lock().attach_missing = missing;
    }

    /// Make handles report that there was nothing left to kill
    pub fn exit_before_kill(&self, exited: bool) {
        self.inner.lock().exited = exited;
    }

    /// A handle that records kills on this launcher
    pub fn handle(&self, tag: AppTag) -> FakeHandle {
        FakeHandle { tag, inner: Arc::clone(&self.inner) }
    }
}

#[async_trait]
impl AppLauncher for FakeLauncher {
    async fn launch(
        &self,
        spec: LaunchSpec,
        listener: Arc<dyn AppListener>,
        log: Arc<LogBuffer>,
    ) -> Result<Arc<dyn AppHandle>, AppError> {
        let mut inner = self.inner.lock();
        inner.calls.push(LauncherCall::Launch {
            app_tag: spec.app_tag.clone(),
            artifact: spec.artifact.clone(),
            args: spec.args.clone(),
        });
        if let Some(ref reason) = inner.launch_error {
            return Err(AppError::LaunchFailed(reason.clone()));
        }
        inner.listeners.insert(spec.app_tag.clone(), listener);
        inner.logs.insert(spec.app_tag.clone(), log);
        Ok(Arc::new(FakeHandle { tag: spec.app_tag, inner: Arc::clone(&self.inner) }))
    }

    async fn attach(
        &self,
        spec: AttachSpec,
        listener: Arc<dyn AppListener>,
        log: Arc<LogBuffer>,
    ) -> Result<Arc<dyn AppHandle>, AppError> {
        let mut inner = self.inner.lock();
        inner.calls.push(LauncherCall::Attach {
            app_tag: spec.app_tag.clone(),
            app_id: spec.app_id.clone(),
        });
        if inner.attach_missing {
            return Err(AppError::NotFound(spec.app_tag.to_string()));
        }
        inner.listeners.insert(spec.app_tag.clone(), listener);
        inner.logs.insert(spec.app_tag.clone(), log);
        Ok(Arc::new(FakeHandle { tag: spec.app_tag, inner: Arc::clone(&self.inner) }))
    }
}

/// Fake application handle
#[derive(Clone)]
pub struct FakeHandle {
    tag: AppTag,
    inner: Arc<Mutex<FakeLauncherState>>,
}

impl FakeHandle {
    /// Standalone handle, not tied to any launcher
    pub fn new(tag: impl Into<AppTag>) -> Self {
        Self { tag: tag.into(), inner: Arc::default() }
    }

    pub fn kill_count(&self) -> usize {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, LauncherCall::Kill { app_tag } if *app_tag == self.tag))
            .count()
    }
}

#[async_trait]
impl AppHandle for FakeHandle {
    fn app_tag(&self) -> &AppTag {
        &self.tag
    }

    async fn kill(&self) -> Result<bool, AppError> {
        let mut inner = self.inner.lock();
        inner.calls.push(LauncherCall::Kill { app_tag: self.tag.clone() });
        Ok(!inner.exited)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
