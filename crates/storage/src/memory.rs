// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory session store for tests.

use crate::store::{SessionStore, StoreError};
use bj_core::{RecoveryMetadata, SessionId};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};

/// A recorded `save` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveCall {
    pub record_type: String,
    pub metadata: RecoveryMetadata,
}

#[derive(Default)]
struct MemoryState {
    records: HashMap<String, BTreeMap<SessionId, RecoveryMetadata>>,
    saves: Vec<SaveCall>,
    counters: HashMap<String, u64>,
    fail_saves: bool,
}

/// Map-backed store that records every save.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<MemoryState>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every save call so far, in order, including failed ones.
    pub fn saves(&self) -> Vec<SaveCall> {
        self.inner.lock().saves.clone()
    }

    pub fn save_count(&self) -> usize {
        self.inner.lock().saves.len()
    }

    /// Make subsequent saves fail with `StoreError::Unavailable`.
    pub fn fail_saves(&self, fail: bool) {
        self.inner.lock().fail_saves = fail;
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, record_type: &str, metadata: &RecoveryMetadata) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        inner.saves.push(SaveCall {
            record_type: record_type.to_string(),
            metadata: metadata.clone(),
        });
        if inner.fail_saves {
            return Err(StoreError::Unavailable("save failures injected".to_string()));
        }
        inner
            .records
            .entry(record_type.to_string())
            .or_default()
            .insert(metadata.id, metadata.clone());
        Ok(())
    }

    fn get(
        &self,
        record_type: &str,
        id: SessionId,
    ) -> Result<Option<RecoveryMetadata>, StoreError> {
        Ok(self.inner.lock().records.get(record_type).and_then(|m| m.get(&id)).cloned())
    }

    fn get_all(&self, record_type: &str) -> Result<Vec<RecoveryMetadata>, StoreError> {
        Ok(self
            .inner
            .lock()
            .records
            .get(record_type)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default())
    }

    fn remove(&self, record_type: &str, id: SessionId) -> Result<bool, StoreError> {
        Ok(self
            .inner
            .lock()
            .records
            .get_mut(record_type)
            .and_then(|m| m.remove(&id))
            .is_some())
    }

    fn next_session_id(&self, record_type: &str) -> Result<SessionId, StoreError> {
        let mut inner = self.inner.lock();
        let counter = inner.counters.entry(record_type.to_string()).or_insert(0);
        *counter += 1;
        Ok(SessionId(*counter))
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
