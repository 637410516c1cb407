// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session error types

use bj_adapters::{AppError, UploadError};
use bj_core::{RequestError, SessionId, SessionStateKind};
use bj_storage::StoreError;
use thiserror::Error;

/// Errors from session operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] RequestError),
    #[error("cannot {op} while session is {state}")]
    IllegalState { op: &'static str, state: SessionStateKind },
    #[error("no artifact has been uploaded")]
    MissingArtifact,
    #[error("session not found: {0}")]
    NotFound(SessionId),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("upload error: {0}")]
    Upload(#[from] UploadError),
    #[error("application error: {0}")]
    App(#[from] AppError),
}
