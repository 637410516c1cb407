// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Batch session orchestrator.
//!
//! A [`BatchSession`] owns one session's state machine, its application
//! handle, its log buffer and its recovery record. Every state change goes
//! through [`bj_core::transition`] under the session's mutation lock, and
//! every change that must survive a restart is written to the store.
//!
//! ```text
//! create(file)     ──► Starting ──► Running ──► Success | Dead | Killed
//! create(delayed)  ──► NotStarted ──set_file──► start_delayed ──► Starting ──► …
//! recover(record)  ──► Recovering ──► Running | terminal
//! ```

mod listener;

use crate::config::EngineConfig;
use crate::error::SessionError;
use bj_adapters::{AppHandle, AppLauncher, AttachSpec, LaunchSpec, LocalStager};
use bj_core::{
    transition, AppInfo, AppOutcome, AppTag, BatchRequest, LogBuffer, RecoveryMetadata, SessionEvent,
    SessionId, SessionState, StartMode, Transition, BATCH_SESSION_TYPE,
};
use bj_storage::{SessionStore, StoreError};
use listener::SessionListener;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncRead;
use tokio::sync::watch;

/// How long `kill` waits for the outcome of an application that finished
/// on its own.
const FINISH_WAIT: Duration = Duration::from_secs(10);

/// A batch job session.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct BatchSession {
    inner: Arc<Inner>,
}

/// Fields fixed at creation plus the locked mutable core.
pub(crate) struct Inner {
    id: SessionId,
    app_tag: AppTag,
    owner: String,
    name: Option<String>,
    args: Vec<String>,
    conf: BTreeMap<String, String>,
    core: Mutex<Core>,
    /// Serializes snapshot-then-save so the last write carries the latest values
    persist_lock: Mutex<()>,
    log: Arc<LogBuffer>,
    store: Arc<dyn SessionStore>,
    launcher: Arc<dyn AppLauncher>,
    stager: LocalStager,
    state_tx: watch::Sender<SessionState>,
}

struct Core {
    state: SessionState,
    app_id: Option<String>,
    app_info: AppInfo,
    artifact_location: String,
    handle: Option<Arc<dyn AppHandle>>,
    /// An upload is staging; blocks a second one
    uploading: bool,
    /// `kill()` ran before a handle existed
    kill_requested: bool,
}

/// Everything a session needs from its surroundings.
struct Parts {
    id: SessionId,
    app_tag: AppTag,
    owner: String,
    name: Option<String>,
    args: Vec<String>,
    conf: BTreeMap<String, String>,
    state: SessionState,
    app_id: Option<String>,
    app_info: AppInfo,
    artifact_location: String,
    handle: Option<Arc<dyn AppHandle>>,
}

impl BatchSession {
    fn build(
        parts: Parts,
        config: &EngineConfig,
        launcher: Arc<dyn AppLauncher>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let (state_tx, _) = watch::channel(parts.state.clone());
        let inner = Inner {
            id: parts.id,
            app_tag: parts.app_tag,
            owner: parts.owner,
            name: parts.name,
            args: parts.args,
            conf: parts.conf,
            core: Mutex::new(Core {
                state: parts.state,
                app_id: parts.app_id,
                app_info: parts.app_info,
                artifact_location: parts.artifact_location,
                handle: parts.handle,
                uploading: false,
                kill_requested: false,
            }),
            persist_lock: Mutex::new(()),
            log: Arc::new(LogBuffer::new(config.log_capacity)),
            store,
            launcher,
            stager: LocalStager::new(config.uploads_dir()),
            state_tx,
        };
        Self { inner: Arc::new(inner) }
    }

    /// Create a session from a submission request.
    ///
    /// The initial record is written before anything starts; if that fails
    /// no session exists. A request with an artifact launches in the
    /// background and the session is returned in `Starting`; a delayed
    /// request parks in `NotStarted`. With `handle_override` the handle is
    /// adopted and nothing is launched.
    pub async fn create(
        id: SessionId,
        request: BatchRequest,
        config: &EngineConfig,
        launcher: Arc<dyn AppLauncher>,
        app_tag: AppTag,
        store: Arc<dyn SessionStore>,
        handle_override: Option<Arc<dyn AppHandle>>,
    ) -> Result<Self, SessionError> {
        let mode = request.validate()?;
        let owner = request.owner.filter(|o| !o.is_empty()).unwrap_or_else(|| config.owner.clone());
        let (state, artifact_location) = match &mode {
            StartMode::Immediate(file) => (SessionState::Starting, file.clone()),
            StartMode::Delayed => (SessionState::NotStarted, String::new()),
        };
        let adopted = handle_override.is_some();

        let session = Self::build(
            Parts {
                id,
                app_tag,
                owner,
                name: request.name,
                args: request.args,
                conf: request.conf,
                state,
                app_id: None,
                app_info: AppInfo::default(),
                artifact_location,
                handle: handle_override,
            },
            config,
            launcher,
            store,
        );
        session.inner.persist()?;

        tracing::info!(
            session_id = %id,
            app_tag = %session.inner.app_tag,
            state = %session.state(),
            "session created"
        );
        if let StartMode::Immediate(artifact) = mode {
            if !adopted {
                session.spawn_launch(artifact);
            }
        }
        Ok(session)
    }

    /// Rebuild a session from its recovery record.
    ///
    /// The session starts in `Recovering` and re-attaches to its application
    /// in the background (or adopts `handle_override`). Nothing is validated
    /// or launched.
    pub async fn recover(
        metadata: RecoveryMetadata,
        config: &EngineConfig,
        launcher: Arc<dyn AppLauncher>,
        store: Arc<dyn SessionStore>,
        handle_override: Option<Arc<dyn AppHandle>>,
    ) -> Self {
        let adopted = handle_override.is_some();
        let session = Self::build(
            Parts {
                id: metadata.id,
                app_tag: metadata.app_tag,
                owner: metadata.owner,
                name: metadata.name,
                args: metadata.args,
                conf: BTreeMap::new(),
                state: SessionState::Recovering,
                app_id: metadata.app_id,
                app_info: metadata.app_info,
                artifact_location: metadata.artifact_location,
                handle: handle_override,
            },
            config,
            launcher,
            store,
        );

        tracing::info!(
            session_id = %session.inner.id,
            app_tag = %session.inner.app_tag,
            app_id = session.app_id().as_deref().unwrap_or("-"),
            "recovering session"
        );
        if !adopted {
            session.spawn_attach();
        }
        session
    }

    /// Stage the artifact of a delayed session.
    ///
    /// Only legal while `NotStarted` and before any artifact was uploaded.
    /// If the record cannot be saved the upload does not count and may be
    /// retried.
    pub async fn set_file<R>(&self, reader: R, file_name: &str) -> Result<(), SessionError>
    where
        R: AsyncRead + Unpin + Send,
    {
        {
            let mut core = self.inner.core.lock();
            if core.state != SessionState::NotStarted
                || core.uploading
                || !core.artifact_location.is_empty()
            {
                return Err(SessionError::IllegalState { op: "set_file", state: core.state.kind() });
            }
            core.uploading = true;
        }

        let staged = self.inner.stager.stage(self.inner.id, reader, file_name).await;

        let artifact = {
            let mut core = self.inner.core.lock();
            let path = match staged {
                Ok(path) if core.state == SessionState::NotStarted => path,
                Ok(_) => {
                    core.uploading = false;
                    return Err(SessionError::IllegalState { op: "set_file", state: core.state.kind() });
                }
                Err(e) => {
                    core.uploading = false;
                    return Err(e.into());
                }
            };
            core.artifact_location = path.display().to_string();
            core.artifact_location.clone()
        };

        // Still uploading: no second upload or start gets in before the save
        let persisted = self.inner.persist();
        {
            let mut core = self.inner.core.lock();
            core.uploading = false;
            if persisted.is_err() {
                core.artifact_location.clear();
            }
        }
        persisted?;

        tracing::info!(session_id = %self.inner.id, %artifact, "artifact uploaded");
        Ok(())
    }

    /// Launch a delayed session whose artifact has been uploaded.
    ///
    /// Moves to `Starting` before returning; the launch runs in the
    /// background.
    pub async fn start_delayed(&self) -> Result<BatchSession, SessionError> {
        let (artifact, adopted) = {
            let mut core = self.inner.core.lock();
            if core.state == SessionState::NotStarted
                && (core.uploading || core.artifact_location.is_empty())
            {
                return Err(SessionError::MissingArtifact);
            }
            self.inner.apply_locked(&mut core, SessionEvent::StartRequested).map_err(|_| {
                SessionError::IllegalState { op: "start_delayed", state: core.state.kind() }
            })?;
            (core.artifact_location.clone(), core.handle.is_some())
        };

        if let Err(e) = self.inner.persist() {
            self.inner.apply(SessionEvent::LaunchFailed {
                reason: format!("failed to persist start: {}", e),
            });
            return Err(e.into());
        }

        if !adopted {
            self.spawn_launch(artifact);
        }
        Ok(self.clone())
    }

    /// Kill the session's application and move to `Killed`.
    ///
    /// A session without an application (not started, or still launching)
    /// goes straight to `Killed`; a launch that completes afterwards is
    /// killed on arrival. Killing a finished session changes nothing. If the
    /// application turns out to have finished already, its own outcome is
    /// awaited and returned instead.
    pub async fn kill(&self) -> Result<SessionState, SessionError> {
        let handle = {
            let mut core = self.inner.core.lock();
            if core.state.is_terminal() {
                return Ok(core.state.clone());
            }
            if core.handle.is_none() {
                core.kill_requested = true;
            }
            core.handle.clone()
        };

        if let Some(handle) = handle {
            if !handle.kill().await? {
                tracing::info!(session_id = %self.inner.id, "application already finished, not killed");
                let state = self.wait_until_inactive(Some(FINISH_WAIT)).await;
                return Ok(state.unwrap_or_else(|| self.state()));
            }
        }

        self.inner.apply(SessionEvent::KillRequested);
        self.inner.persist_logged("kill");
        Ok(self.state())
    }

    /// Wait until the session reaches a terminal state.
    ///
    /// Returns `None` if `timeout` elapses first.
    pub async fn wait_until_inactive(&self, timeout: Option<Duration>) -> Option<SessionState> {
        let mut rx = self.inner.state_tx.subscribe();
        let wait = async move {
            let state = rx.wait_for(SessionState::is_terminal).await.ok()?;
            Some(state.clone())
        };
        match timeout {
            Some(limit) => tokio::time::timeout(limit, wait).await.ok().flatten(),
            None => wait.await,
        }
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state_tx.subscribe()
    }

    // Notifications. The listener registered with the launcher forwards
    // here; tests call them directly.

    pub fn app_id_known(&self, app_id: &str) {
        self.inner.app_id_known(app_id);
    }

    pub fn info_changed(&self, info: &AppInfo) {
        self.inner.info_changed(info);
    }

    pub fn finished(&self, outcome: AppOutcome) {
        self.inner.finished(outcome);
    }

    // Accessors

    pub fn id(&self) -> SessionId {
        self.inner.id
    }

    pub fn app_tag(&self) -> &AppTag {
        &self.inner.app_tag
    }

    pub fn owner(&self) -> &str {
        &self.inner.owner
    }

    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    pub fn state(&self) -> SessionState {
        self.inner.core.lock().state.clone()
    }

    pub fn is_active(&self) -> bool {
        self.inner.core.lock().state.is_active()
    }

    pub fn app_id(&self) -> Option<String> {
        self.inner.core.lock().app_id.clone()
    }

    pub fn app_info(&self) -> AppInfo {
        self.inner.core.lock().app_info.clone()
    }

    pub fn artifact_location(&self) -> String {
        self.inner.core.lock().artifact_location.clone()
    }

    /// Snapshot of the buffered output, oldest first.
    pub fn log_lines(&self) -> Vec<String> {
        self.inner.log.snapshot()
    }

    /// The record that would be persisted now.
    pub fn to_metadata(&self) -> RecoveryMetadata {
        self.inner.to_metadata()
    }

    fn spawn_launch(&self, artifact: String) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let listener = Arc::new(SessionListener::new(&inner));
            let mut spec = LaunchSpec::new(inner.id, inner.app_tag.clone(), artifact)
                .args(inner.args.clone())
                .conf(inner.conf.clone());
            spec.name = inner.name.clone();

            match inner.launcher.launch(spec, listener, Arc::clone(&inner.log)).await {
                Ok(handle) => inner.adopt_handle(handle).await,
                Err(e) => {
                    tracing::warn!(session_id = %inner.id, error = %e, "launch failed");
                    inner.apply(SessionEvent::LaunchFailed { reason: e.to_string() });
                    inner.persist_logged("launch_failed");
                }
            }
        });
    }

    fn spawn_attach(&self) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let listener = Arc::new(SessionListener::new(&inner));
            let spec = AttachSpec {
                session_id: inner.id,
                app_tag: inner.app_tag.clone(),
                app_id: inner.core.lock().app_id.clone(),
            };

            match inner.launcher.attach(spec, listener, Arc::clone(&inner.log)).await {
                Ok(handle) => inner.adopt_handle(handle).await,
                Err(e) => {
                    tracing::warn!(session_id = %inner.id, error = %e, "re-attach failed");
                    inner.apply(SessionEvent::LaunchFailed {
                        reason: format!("failed to re-attach: {}", e),
                    });
                    inner.persist_logged("attach_failed");
                }
            }
        });
    }
}

impl Inner {
    /// Apply `event` under the mutation lock.
    ///
    /// Returns true if the state advanced.
    fn apply(&self, event: SessionEvent) -> bool {
        let mut core = self.core.lock();
        self.apply_locked(&mut core, event).unwrap_or(false)
    }

    fn apply_locked(&self, core: &mut Core, event: SessionEvent) -> Result<bool, &'static str> {
        match transition(&core.state, &event) {
            Transition::Advance(next) => {
                tracing::info!(
                    session_id = %self.id,
                    from = %core.state,
                    to = %next,
                    %event,
                    "session state changed"
                );
                core.state = next.clone();
                self.state_tx.send_replace(next);
                Ok(true)
            }
            Transition::Ignore => {
                tracing::debug!(session_id = %self.id, state = %core.state, %event, "event ignored");
                Ok(false)
            }
            Transition::Reject(reason) => {
                tracing::debug!(session_id = %self.id, state = %core.state, %event, reason, "event rejected");
                Err(reason)
            }
        }
    }

    async fn adopt_handle(&self, handle: Arc<dyn AppHandle>) {
        let kill_now = {
            let mut core = self.core.lock();
            core.handle = Some(Arc::clone(&handle));
            core.kill_requested
        };
        if kill_now {
            tracing::info!(session_id = %self.id, "killing application launched after kill request");
            if let Err(e) = handle.kill().await {
                tracing::warn!(session_id = %self.id, error = %e, "failed to kill late application");
            }
        }
    }

    fn to_metadata(&self) -> RecoveryMetadata {
        let core = self.core.lock();
        let mut record = RecoveryMetadata::new(self.id, self.app_tag.clone(), self.owner.clone())
            .artifact_location(core.artifact_location.clone())
            .app_info(core.app_info.clone())
            .args(self.args.clone());
        record.app_id = core.app_id.clone();
        record.name = self.name.clone();
        record
    }

    fn persist(&self) -> Result<(), StoreError> {
        let _guard = self.persist_lock.lock();
        let record = self.to_metadata();
        self.store.save(BATCH_SESSION_TYPE, &record)
    }

    /// Persist from a notification path, where failures cannot propagate.
    fn persist_logged(&self, op: &'static str) {
        if let Err(e) = self.persist() {
            tracing::error!(session_id = %self.id, op, error = %e, "failed to persist session");
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
