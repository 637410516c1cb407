// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry of live sessions.

use crate::config::EngineConfig;
use crate::error::SessionError;
use crate::session::BatchSession;
use bj_adapters::{AppLauncher, LocalLauncher};
use bj_core::{AppTag, BatchRequest, RecoveryMetadata, SessionId, SessionState, BATCH_SESSION_TYPE};
use bj_storage::{FileSessionStore, SessionStore};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// How long `delete` waits for an unregistered session to re-attach.
const ATTACH_WAIT: Duration = Duration::from_secs(10);

/// Owns every session of this process, keyed by id.
pub struct SessionManager {
    config: EngineConfig,
    launcher: Arc<dyn AppLauncher>,
    store: Arc<dyn SessionStore>,
    sessions: RwLock<BTreeMap<SessionId, BatchSession>>,
}

impl SessionManager {
    pub fn new(
        config: EngineConfig,
        launcher: Arc<dyn AppLauncher>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self { config, launcher, store, sessions: RwLock::new(BTreeMap::new()) }
    }

    /// Manager over the file store and local engine under `config.state_dir`.
    ///
    /// Also returns the launcher so the caller can shut its monitors down.
    pub fn open_local(config: EngineConfig) -> Result<(Self, LocalLauncher), SessionError> {
        let store = FileSessionStore::open(config.store_dir())?;
        let launcher =
            LocalLauncher::new(config.apps_dir()).with_poll_interval(config.poll_interval);
        let manager = Self::new(config, Arc::new(launcher.clone()), Arc::new(store));
        Ok((manager, launcher))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Allocate an id and tag, then create and register a session.
    pub async fn submit(&self, request: BatchRequest) -> Result<BatchSession, SessionError> {
        let id = self.store.next_session_id(BATCH_SESSION_TYPE)?;
        let app_tag = AppTag::generate(id);
        let session = BatchSession::create(
            id,
            request,
            &self.config,
            Arc::clone(&self.launcher),
            app_tag,
            Arc::clone(&self.store),
            None,
        )
        .await?;
        self.sessions.write().insert(id, session.clone());
        Ok(session)
    }

    /// Recover every persisted batch session not already registered.
    pub async fn recover_all(&self) -> Result<Vec<BatchSession>, SessionError> {
        let records = self.store.get_all(BATCH_SESSION_TYPE)?;
        tracing::info!(count = records.len(), "recovering sessions");

        let mut recovered = Vec::new();
        for record in records {
            if let Some(existing) = self.get(record.id) {
                tracing::debug!(session_id = %record.id, "session already registered");
                recovered.push(existing);
                continue;
            }
            recovered.push(self.recover_record(record).await);
        }
        Ok(recovered)
    }

    /// Recover one persisted session, or return it if already registered.
    pub async fn recover(&self, id: SessionId) -> Result<BatchSession, SessionError> {
        if let Some(session) = self.get(id) {
            return Ok(session);
        }
        let record =
            self.store.get(BATCH_SESSION_TYPE, id)?.ok_or(SessionError::NotFound(id))?;
        Ok(self.recover_record(record).await)
    }

    async fn recover_record(&self, record: RecoveryMetadata) -> BatchSession {
        let id = record.id;
        let session = BatchSession::recover(
            record,
            &self.config,
            Arc::clone(&self.launcher),
            Arc::clone(&self.store),
            None,
        )
        .await;
        self.sessions.write().entry(id).or_insert(session).clone()
    }

    /// Rebuild a session outside the registry and wait for it to re-attach.
    async fn attach_unregistered(&self, id: SessionId) -> Result<Option<BatchSession>, SessionError> {
        let Some(record) = self.store.get(BATCH_SESSION_TYPE, id)? else {
            return Ok(None);
        };
        let session = BatchSession::recover(
            record,
            &self.config,
            Arc::clone(&self.launcher),
            Arc::clone(&self.store),
            None,
        )
        .await;

        let mut rx = session.subscribe();
        let attached =
            tokio::time::timeout(ATTACH_WAIT, rx.wait_for(|s| *s != SessionState::Recovering))
                .await
                .is_ok_and(|r| r.is_ok());
        if !attached {
            tracing::warn!(session_id = %id, "session did not re-attach before delete");
        }
        Ok(Some(session))
    }

    pub fn get(&self, id: SessionId) -> Option<BatchSession> {
        self.sessions.read().get(&id).cloned()
    }

    /// Registered sessions ordered by id.
    pub fn list(&self) -> Vec<BatchSession> {
        self.sessions.read().values().cloned().collect()
    }

    /// Persisted records, registered or not.
    pub fn records(&self) -> Result<Vec<RecoveryMetadata>, SessionError> {
        Ok(self.store.get_all(BATCH_SESSION_TYPE)?)
    }

    pub async fn kill(&self, id: SessionId) -> Result<SessionState, SessionError> {
        let session = self.get(id).ok_or(SessionError::NotFound(id))?;
        session.kill().await
    }

    /// Kill the session, forget it and remove its record.
    ///
    /// A persisted session that is not registered is re-attached first so
    /// its application is killed rather than orphaned.
    pub async fn delete(&self, id: SessionId) -> Result<(), SessionError> {
        let registered = self.sessions.write().remove(&id);
        let session = match registered {
            Some(session) => Some(session),
            None => self.attach_unregistered(id).await?,
        };
        if let Some(session) = session {
            session.kill().await?;
        }
        if !self.store.remove(BATCH_SESSION_TYPE, id)? {
            tracing::debug!(session_id = %id, "no record to remove");
        }
        tracing::info!(session_id = %id, "session deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
