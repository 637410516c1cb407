// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session store contract.

use bj_core::{RecoveryMetadata, SessionId};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from session store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid record type: {0:?}")]
    InvalidRecordType(String),
    #[error("corrupt id counter at {path}: {content:?}")]
    CorruptCounter { path: PathBuf, content: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io { path: path.into(), source }
    }
}

/// Key-value store of recovery records, one namespace per record type.
///
/// `save` is a full replace keyed by `metadata.id` and may be called any
/// number of times for the same change. Implementations must be durable
/// by the time `save` returns.
pub trait SessionStore: Send + Sync {
    fn save(&self, record_type: &str, metadata: &RecoveryMetadata) -> Result<(), StoreError>;

    fn get(&self, record_type: &str, id: SessionId)
        -> Result<Option<RecoveryMetadata>, StoreError>;

    /// Every decodable record of the type, ordered by id.
    fn get_all(&self, record_type: &str) -> Result<Vec<RecoveryMetadata>, StoreError>;

    /// Returns whether a record was removed.
    fn remove(&self, record_type: &str, id: SessionId) -> Result<bool, StoreError>;

    /// Allocate a fresh session id, never handed out before by this store.
    fn next_session_id(&self, record_type: &str) -> Result<SessionId, StoreError>;
}
