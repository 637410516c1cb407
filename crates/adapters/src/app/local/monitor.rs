// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-application monitor task.

use super::{local_app_id, process_alive, AppDir};
use crate::app::AppListener;
use bj_core::{AppInfo, AppOutcome, AppTag, LogBuffer};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub(super) struct Monitor {
    pub(super) dir: AppDir,
    pub(super) tag: AppTag,
    pub(super) pid: i32,
    pub(super) listener: Arc<dyn AppListener>,
    pub(super) log: Arc<LogBuffer>,
    pub(super) poll_interval: Duration,
    pub(super) cancel: CancellationToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Status {
    Running,
    Finished(AppOutcome),
}

impl Monitor {
    /// Tail output and poll for completion until the application finishes
    /// or the launcher shuts down.
    ///
    /// An application that is already done on the first look reports
    /// `finished` before its id, so a recovering session goes straight to
    /// its terminal state.
    pub(super) async fn run(self) {
        let app_id = local_app_id(self.pid);
        let info = AppInfo::new(
            Some(format!("file://{}", self.dir.output_path().display())),
            None,
        );
        let mut tail = LogTail::new(self.dir.output_path());
        let mut first_look = true;

        loop {
            tail.pump(&self.log);

            match status(&self.dir, self.pid) {
                Status::Finished(outcome) => {
                    tail.finish(&self.log);
                    tracing::info!(app_tag = %self.tag, %app_id, %outcome, "application finished");
                    self.listener.finished(outcome);
                    if first_look {
                        self.listener.app_id_known(&app_id);
                        self.listener.info_changed(&info);
                    }
                    return;
                }
                Status::Running if first_look => {
                    tracing::debug!(app_tag = %self.tag, %app_id, "application running");
                    self.listener.app_id_known(&app_id);
                    self.listener.info_changed(&info);
                }
                Status::Running => {}
            }
            first_look = false;

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::debug!(app_tag = %self.tag, "monitor stopped");
                    return;
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }
}

/// Current status of a local application.
pub(super) fn status(dir: &AppDir, pid: i32) -> Status {
    let alive = process_alive(pid);

    if dir.is_killed() {
        return if alive { Status::Running } else { Status::Finished(AppOutcome::Killed) };
    }
    if let Some(code) = dir.read_exit() {
        return Status::Finished(outcome_for_exit(code));
    }
    if alive {
        return Status::Running;
    }
    // The wrapper may have renamed the exit file between the two checks
    match dir.read_exit() {
        Some(code) => Status::Finished(outcome_for_exit(code)),
        None => Status::Finished(AppOutcome::Failure(
            "process exited without reporting a status".to_string(),
        )),
    }
}

pub(super) fn outcome_for_exit(code: i32) -> AppOutcome {
    if code == 0 {
        AppOutcome::Success { exit_code: Some(0) }
    } else {
        AppOutcome::Failure(format!("exit code {}", code))
    }
}

/// Incremental reader that turns a growing file into lines.
pub(super) struct LogTail {
    path: PathBuf,
    offset: u64,
    partial: Vec<u8>,
}

impl LogTail {
    pub(super) fn new(path: PathBuf) -> Self {
        Self { path, offset: 0, partial: Vec::new() }
    }

    /// Push every complete line written since the last call.
    pub(super) fn pump(&mut self, log: &LogBuffer) {
        let chunk = match self.read_new() {
            Ok(chunk) => chunk,
            Err(e) => {
                tracing::trace!(path = %self.path.display(), error = %e, "output not readable yet");
                return;
            }
        };
        if chunk.is_empty() {
            return;
        }
        self.partial.extend_from_slice(&chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.partial.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.partial.drain(..=pos).collect();
            lines.push(to_line(&line[..line.len() - 1]));
        }
        log.extend(lines);
    }

    /// Pump, then flush a trailing line that has no newline.
    pub(super) fn finish(&mut self, log: &LogBuffer) {
        self.pump(log);
        if !self.partial.is_empty() {
            let rest = std::mem::take(&mut self.partial);
            log.push(to_line(&rest));
        }
    }

    fn read_new(&mut self) -> std::io::Result<Vec<u8>> {
        let mut file = File::open(&self.path)?;
        let len = file.metadata()?.len();
        if len < self.offset {
            // Truncated underneath us; start over
            self.offset = 0;
            self.partial.clear();
        }
        file.seek(SeekFrom::Start(self.offset))?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        self.offset += buf.len() as u64;
        Ok(buf)
    }
}

fn to_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
