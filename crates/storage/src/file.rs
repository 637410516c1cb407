// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-backed session store.
//!
//! Layout: `<root>/<record_type>/<id>.json` plus a `next_id` counter per
//! record type. Records are written to a uniquely named temp file, synced,
//! then renamed over the target so readers never see a partial record.

use crate::store::{SessionStore, StoreError};
use bj_core::{RecoveryMetadata, SessionId};
use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

const COUNTER_FILE: &str = "next_id";

#[derive(Debug, Clone)]
pub struct FileSessionStore {
    root: PathBuf,
}

impl FileSessionStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| StoreError::io(&root, e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn type_dir(&self, record_type: &str) -> Result<PathBuf, StoreError> {
        let valid = !record_type.is_empty()
            && record_type.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidRecordType(record_type.to_string()));
        }
        Ok(self.root.join(record_type))
    }

    fn record_path(&self, record_type: &str, id: SessionId) -> Result<PathBuf, StoreError> {
        Ok(self.type_dir(record_type)?.join(format!("{}.json", id)))
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, record_type: &str, metadata: &RecoveryMetadata) -> Result<(), StoreError> {
        let path = self.record_path(record_type, metadata.id)?;
        let bytes = metadata.encode()?;
        write_atomic(&path, &bytes)?;
        tracing::trace!(session_id = %metadata.id, path = %path.display(), "saved record");
        Ok(())
    }

    fn get(
        &self,
        record_type: &str,
        id: SessionId,
    ) -> Result<Option<RecoveryMetadata>, StoreError> {
        let path = self.record_path(record_type, id)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(RecoveryMetadata::decode(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn get_all(&self, record_type: &str) -> Result<Vec<RecoveryMetadata>, StoreError> {
        let dir = self.type_dir(record_type)?;
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(dir, e)),
        };

        let mut records = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StoreError::io(&dir, e))?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let decoded = fs::read(&path)
                .map_err(|e| e.to_string())
                .and_then(|bytes| RecoveryMetadata::decode(&bytes).map_err(|e| e.to_string()));
            match decoded {
                Ok(record) => records.push(record),
                Err(error) => {
                    tracing::warn!(path = %path.display(), error = %error, "skipping unreadable record");
                }
            }
        }
        records.sort_by_key(|r| r.id);
        Ok(records)
    }

    fn remove(&self, record_type: &str, id: SessionId) -> Result<bool, StoreError> {
        let path = self.record_path(record_type, id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn next_session_id(&self, record_type: &str) -> Result<SessionId, StoreError> {
        let dir = self.type_dir(record_type)?;
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        let path = dir.join(COUNTER_FILE);

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;
        // Held until `file` drops; other processes block here.
        file.lock_exclusive().map_err(|e| StoreError::io(&path, e))?;

        let mut content = String::new();
        file.read_to_string(&mut content).map_err(|e| StoreError::io(&path, e))?;
        let next = match content.trim() {
            "" => highest_record_id(&dir)?.map(SessionId::next).unwrap_or(SessionId(1)),
            s => s.parse::<u64>().map(SessionId).map_err(|_| StoreError::CorruptCounter {
                path: path.clone(),
                content: content.clone(),
            })?,
        };

        file.set_len(0).map_err(|e| StoreError::io(&path, e))?;
        file.seek(SeekFrom::Start(0)).map_err(|e| StoreError::io(&path, e))?;
        write!(file, "{}", next.next()).map_err(|e| StoreError::io(&path, e))?;
        file.sync_all().map_err(|e| StoreError::io(&path, e))?;

        Ok(next)
    }
}

/// Highest id among existing record files, for a store whose counter was lost.
fn highest_record_id(dir: &Path) -> Result<Option<SessionId>, StoreError> {
    let entries = fs::read_dir(dir).map_err(|e| StoreError::io(dir, e))?;
    let mut highest = None;
    for entry in entries {
        let path = entry.map_err(|e| StoreError::io(dir, e))?.path();
        if path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        let id = path.file_stem().and_then(|s| s.to_str()).and_then(|s| s.parse::<u64>().ok());
        if let Some(id) = id.map(SessionId) {
            highest = highest.max(Some(id));
        }
    }
    Ok(highest)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let parent = path.parent().ok_or_else(|| {
        StoreError::io(path, std::io::Error::new(ErrorKind::InvalidInput, "no parent directory"))
    })?;
    fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;

    // Unique per write; several processes may save the same record at once
    let mut tmp = tempfile::Builder::new()
        .prefix(".record-")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| StoreError::io(parent, e))?;
    tmp.write_all(bytes).map_err(|e| StoreError::io(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| StoreError::io(tmp.path(), e))?;

    tmp.persist(path).map_err(|e| StoreError::io(path, e.error))?;
    Ok(())
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
