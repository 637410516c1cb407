// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local process engine.
//!
//! Runs each application as `sh <artifact> <args…>` in its own process
//! group, so applications outlive the launcher and can be re-attached by a
//! later process. Per-application state lives in `<apps_dir>/<app_tag>/`:
//!
//! - `pid`: process id of the wrapper shell (also the process group id)
//! - `output.log`: combined stdout/stderr
//! - `exit`: exit code, written by the wrapper when the artifact returns
//! - `killed`: marker written before the group is signalled

mod monitor;

use super::{AppError, AppHandle, AppLauncher, AppListener, AttachSpec, LaunchSpec};
use async_trait::async_trait;
use bj_core::{AppTag, LogBuffer};
use monitor::Monitor;
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Poll cadence used when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Time a killed group gets to exit before SIGKILL.
const KILL_GRACE: Duration = Duration::from_secs(5);

/// `$0` is the artifact; the exit file appears atomically via rename.
const WRAPPER: &str = r#"sh "$0" "$@"
code=$?
printf '%s\n' "$code" > "$BJ_APP_DIR/exit.tmp" && mv -f "$BJ_APP_DIR/exit.tmp" "$BJ_APP_DIR/exit""#;

/// Launcher backed by local processes.
#[derive(Clone)]
pub struct LocalLauncher {
    apps_dir: PathBuf,
    poll_interval: Duration,
    cancel: CancellationToken,
}

impl LocalLauncher {
    pub fn new(apps_dir: impl Into<PathBuf>) -> Self {
        Self {
            apps_dir: apps_dir.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn apps_dir(&self) -> &Path {
        &self.apps_dir
    }

    /// Stop every monitor task. Applications keep running.
    pub fn shutdown(&self) {
        tracing::debug!(apps_dir = %self.apps_dir.display(), "stopping application monitors");
        self.cancel.cancel();
    }

    fn start_monitor(
        &self,
        dir: AppDir,
        tag: AppTag,
        pid: i32,
        listener: Arc<dyn AppListener>,
        log: Arc<LogBuffer>,
    ) {
        let monitor = Monitor {
            dir,
            tag,
            pid,
            listener,
            log,
            poll_interval: self.poll_interval,
            cancel: self.cancel.child_token(),
        };
        tokio::spawn(monitor.run());
    }
}

#[async_trait]
impl AppLauncher for LocalLauncher {
    async fn launch(
        &self,
        spec: LaunchSpec,
        listener: Arc<dyn AppListener>,
        log: Arc<LogBuffer>,
    ) -> Result<Arc<dyn AppHandle>, AppError> {
        let span = tracing::info_span!(
            "app.launch",
            session_id = %spec.session_id,
            app_tag = %spec.app_tag,
        );
        async {
            let artifact = resolve_artifact(&spec.artifact)?;
            let dir = AppDir::new(&self.apps_dir, &spec.app_tag);
            dir.prepare()?;

            let output = fs::File::create(dir.output_path())?;
            let stderr = output.try_clone()?;

            let mut cmd = tokio::process::Command::new("sh");
            cmd.arg("-c")
                .arg(WRAPPER)
                .arg(&artifact)
                .args(&spec.args)
                .env("BJ_APP_DIR", dir.root())
                .env("BJ_APP_TAG", spec.app_tag.as_str())
                .env("BJ_SESSION_ID", spec.session_id.to_string())
                .stdin(Stdio::null())
                .stdout(Stdio::from(output))
                .stderr(Stdio::from(stderr))
                .process_group(0);
            if let Some(ref name) = spec.name {
                cmd.env("BJ_APP_NAME", name);
            }
            for (key, value) in &spec.conf {
                cmd.env(conf_env_name(key), value);
            }

            let child = cmd
                .spawn()
                .map_err(|e| AppError::LaunchFailed(format!("failed to spawn sh: {}", e)))?;
            let pid = child.id().map(|id| id as i32).ok_or_else(|| {
                AppError::LaunchFailed("process exited before it could be tracked".to_string())
            })?;
            dir.write_pid(pid)?;

            // Spawn reaper task to prevent zombie processes
            let reaper_tag = spec.app_tag.clone();
            tokio::spawn(async move {
                let mut child = child;
                match child.wait().await {
                    Ok(status) => {
                        tracing::debug!(app_tag = %reaper_tag, exit_status = %status, "application process exited");
                    }
                    Err(e) => {
                        tracing::error!(app_tag = %reaper_tag, error = %e, "failed to wait on application process");
                    }
                }
            });

            tracing::info!(pid, artifact = %artifact.display(), "application launched");
            self.start_monitor(dir.clone(), spec.app_tag.clone(), pid, listener, log);
            Ok(Arc::new(LocalHandle { tag: spec.app_tag, dir, pid }) as Arc<dyn AppHandle>)
        }
        .instrument(span)
        .await
    }

    async fn attach(
        &self,
        spec: AttachSpec,
        listener: Arc<dyn AppListener>,
        log: Arc<LogBuffer>,
    ) -> Result<Arc<dyn AppHandle>, AppError> {
        let span = tracing::info_span!(
            "app.attach",
            session_id = %spec.session_id,
            app_tag = %spec.app_tag,
        );
        async {
            let dir = AppDir::new(&self.apps_dir, &spec.app_tag);
            let pid = dir
                .read_pid()?
                .ok_or_else(|| AppError::NotFound(spec.app_tag.to_string()))?;

            let app_id = local_app_id(pid);
            if let Some(ref recorded) = spec.app_id {
                if *recorded != app_id {
                    tracing::warn!(recorded = %recorded, found = %app_id, "application id differs from record");
                }
            }

            tracing::info!(pid, "attached to application");
            self.start_monitor(dir.clone(), spec.app_tag.clone(), pid, listener, log);
            Ok(Arc::new(LocalHandle { tag: spec.app_tag, dir, pid }) as Arc<dyn AppHandle>)
        }
        .instrument(span)
        .await
    }
}

/// Handle to a local application's process group.
struct LocalHandle {
    tag: AppTag,
    dir: AppDir,
    pid: i32,
}

#[async_trait]
impl AppHandle for LocalHandle {
    fn app_tag(&self) -> &AppTag {
        &self.tag
    }

    async fn kill(&self) -> Result<bool, AppError> {
        if self.dir.read_exit().is_some() {
            tracing::debug!(app_tag = %self.tag, "application already exited, nothing to kill");
            return Ok(false);
        }

        tracing::info!(app_tag = %self.tag, pid = self.pid, "killing application");
        self.dir.mark_killed()?;
        match signal::killpg(Pid::from_raw(self.pid), Signal::SIGTERM) {
            Ok(()) => {}
            Err(Errno::ESRCH) => {
                // Gone before the signal; the status it left behind stands
                tracing::debug!(app_tag = %self.tag, "process group already gone");
                self.dir.clear_killed()?;
                return Ok(false);
            }
            Err(e) => return Err(AppError::KillFailed(e.to_string())),
        }

        let pid = self.pid;
        tokio::spawn(async move {
            tokio::time::sleep(KILL_GRACE).await;
            if process_alive(pid) {
                tracing::warn!(pid, "application ignored SIGTERM, sending SIGKILL");
                let _ = signal::killpg(Pid::from_raw(pid), Signal::SIGKILL);
            }
        });
        Ok(true)
    }
}

/// Application id reported for a local process.
pub fn local_app_id(pid: i32) -> String {
    format!("local-{}", pid)
}

/// Environment variable carrying an engine configuration entry.
///
/// `spark.executor.memory` becomes `BJ_CONF_SPARK_EXECUTOR_MEMORY`.
pub fn conf_env_name(key: &str) -> String {
    let mut name = String::from("BJ_CONF_");
    name.extend(
        key.chars().map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' }),
    );
    name
}

fn resolve_artifact(artifact: &str) -> Result<PathBuf, AppError> {
    let path = PathBuf::from(artifact.strip_prefix("file://").unwrap_or(artifact));
    if !path.is_file() {
        return Err(AppError::LaunchFailed(format!("artifact not found: {}", path.display())));
    }
    Ok(path)
}

pub(crate) fn process_alive(pid: i32) -> bool {
    match signal::kill(Pid::from_raw(pid), None) {
        Ok(()) | Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}

/// Files describing one local application.
#[derive(Debug, Clone)]
pub(crate) struct AppDir {
    root: PathBuf,
}

impl AppDir {
    pub(crate) fn new(apps_dir: &Path, tag: &AppTag) -> Self {
        Self { root: apps_dir.join(tag.as_str()) }
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn output_path(&self) -> PathBuf {
        self.root.join("output.log")
    }

    fn pid_path(&self) -> PathBuf {
        self.root.join("pid")
    }

    fn exit_path(&self) -> PathBuf {
        self.root.join("exit")
    }

    fn killed_path(&self) -> PathBuf {
        self.root.join("killed")
    }

    /// Create the directory and clear leftovers from an earlier run.
    fn prepare(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.root)?;
        for path in [self.pid_path(), self.exit_path(), self.killed_path()] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn write_pid(&self, pid: i32) -> Result<(), AppError> {
        fs::write(self.pid_path(), format!("{}\n", pid))?;
        Ok(())
    }

    pub(crate) fn read_pid(&self) -> Result<Option<i32>, AppError> {
        match fs::read_to_string(self.pid_path()) {
            Ok(content) => Ok(content.trim().parse().ok()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn read_exit(&self) -> Option<i32> {
        fs::read_to_string(self.exit_path()).ok()?.trim().parse().ok()
    }

    pub(crate) fn is_killed(&self) -> bool {
        self.killed_path().exists()
    }

    fn mark_killed(&self) -> Result<(), AppError> {
        fs::write(self.killed_path(), b"")?;
        Ok(())
    }

    fn clear_killed(&self) -> Result<(), AppError> {
        match fs::remove_file(self.killed_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
