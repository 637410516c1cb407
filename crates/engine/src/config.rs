// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration.
//!
//! Values come from the environment, then `<state_dir>/config.toml`, then
//! built-in defaults, in that order of precedence.

use crate::env;
use bj_core::DEFAULT_LOG_CAPACITY;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Poll interval used when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = bj_adapters::app::local::DEFAULT_POLL_INTERVAL;

const CONFIG_FILE: &str = "config.toml";

/// Errors from loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine state directory (set BJ_STATE_DIR)")]
    NoStateDir,
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub state_dir: PathBuf,
    /// Output lines kept per session
    pub log_capacity: usize,
    /// How often the local engine polls applications
    pub poll_interval: Duration,
    /// Owner assigned to sessions whose request names none
    pub owner: String,
}

/// Optional overrides read from `config.toml`
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    log_capacity: Option<usize>,
    poll_interval_ms: Option<u64>,
    owner: Option<String>,
}

impl EngineConfig {
    /// Defaults rooted at `state_dir`, ignoring environment and files.
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
            log_capacity: DEFAULT_LOG_CAPACITY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            owner: env::login_name(),
        }
    }

    bj_core::setters! {
        into {
            owner: String,
        }
        set {
            log_capacity: usize,
            poll_interval: Duration,
        }
    }

    /// Load from the environment and the resolved state directory.
    pub fn load() -> Result<Self, ConfigError> {
        let state_dir = env::state_dir().ok_or(ConfigError::NoStateDir)?;
        Self::load_from(state_dir)
    }

    /// Load with `state_dir` fixed; environment overrides still apply.
    pub fn load_from(state_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::new(state_dir);
        let file = read_file_config(&config.config_path())?;

        if let Some(capacity) = env::log_capacity().or(file.log_capacity) {
            config.log_capacity = capacity;
        }
        if let Some(interval) =
            env::poll_interval().or(file.poll_interval_ms.map(Duration::from_millis))
        {
            config.poll_interval = interval;
        }
        if let Some(owner) = env::owner().or(file.owner.filter(|o| !o.is_empty())) {
            config.owner = owner;
        }

        tracing::debug!(
            state_dir = %config.state_dir.display(),
            log_capacity = config.log_capacity,
            poll_ms = config.poll_interval.as_millis() as u64,
            owner = %config.owner,
            "loaded engine config"
        );
        Ok(config)
    }

    pub fn config_path(&self) -> PathBuf {
        self.state_dir.join(CONFIG_FILE)
    }

    pub fn store_dir(&self) -> PathBuf {
        self.state_dir.join("store")
    }

    pub fn apps_dir(&self) -> PathBuf {
        self.state_dir.join("apps")
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.state_dir.join("uploads")
    }

    pub fn log_path(&self) -> PathBuf {
        self.state_dir.join("bj.log")
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(FileConfig::default()),
        Err(source) => return Err(ConfigError::Read { path: path.to_path_buf(), source }),
    };
    toml::from_str(&content).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
