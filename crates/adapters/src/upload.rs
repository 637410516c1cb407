// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Artifact staging for delayed-start sessions.

use bj_core::SessionId;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWriteExt};

/// Errors from staging an uploaded artifact
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("invalid artifact file name: {0:?}")]
    InvalidFileName(String),
    #[error("failed to stage artifact at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Stores uploaded artifacts under `<uploads_dir>/<session id>/<file name>`.
#[derive(Debug, Clone)]
pub struct LocalStager {
    uploads_dir: PathBuf,
}

impl LocalStager {
    pub fn new(uploads_dir: impl Into<PathBuf>) -> Self {
        Self { uploads_dir: uploads_dir.into() }
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    /// Copy `reader` to the session's upload directory and return the path.
    ///
    /// Only the last component of `file_name` is used.
    pub async fn stage<R>(
        &self,
        session_id: SessionId,
        mut reader: R,
        file_name: &str,
    ) -> Result<PathBuf, UploadError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let name = sanitize_file_name(file_name)?;
        let dir = self.uploads_dir.join(session_id.to_string());
        let path = dir.join(name);
        let io_err = |source| UploadError::Io { path: path.clone(), source };

        tokio::fs::create_dir_all(&dir).await.map_err(io_err)?;
        let mut file = tokio::fs::File::create(&path).await.map_err(io_err)?;
        let bytes = tokio::io::copy(&mut reader, &mut file).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)?;
        file.sync_all().await.map_err(io_err)?;

        tracing::info!(session_id = %session_id, path = %path.display(), bytes, "artifact staged");
        Ok(path)
    }
}

/// Final path component of an uploaded file name.
pub fn sanitize_file_name(file_name: &str) -> Result<&str, UploadError> {
    let name = file_name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if name.is_empty() || name == "." || name == ".." {
        return Err(UploadError::InvalidFileName(file_name.to_string()));
    }
    Ok(name)
}

#[cfg(test)]
#[path = "upload_tests.rs"]
mod tests;
