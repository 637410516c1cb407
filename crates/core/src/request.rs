// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Batch submission requests.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from validating a [`BatchRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("request must name an artifact file or set delayed")]
    MissingArtifact,
    #[error("request cannot both name an artifact file and set delayed")]
    ArtifactWithDelayed,
    #[error("artifact file must not be empty")]
    EmptyArtifact,
}

/// A batch job submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    /// Path or URI of the job artifact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Artifact will be uploaded after the session is created
    #[serde(default)]
    pub delayed: bool,
    /// Arguments passed to the artifact
    #[serde(default)]
    pub args: Vec<String>,
    /// Human label for the session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Owner reference; falls back to the configured owner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Engine configuration for the application
    #[serde(default)]
    pub conf: BTreeMap<String, String>,
}

/// How a validated request starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartMode {
    /// Launch right away with this artifact
    Immediate(String),
    /// Wait for the artifact to be uploaded
    Delayed,
}

impl BatchRequest {
    /// Request that launches `file` immediately.
    pub fn file(file: impl Into<String>) -> Self {
        Self { file: Some(file.into()), ..Self::default() }
    }

    /// Request whose artifact will be uploaded later.
    pub fn delayed() -> Self {
        Self { delayed: true, ..Self::default() }
    }

    crate::setters! {
        set {
            args: Vec<String>,
            conf: BTreeMap<String, String>,
        }
        option {
            name: String,
            owner: String,
        }
    }

    /// Check that exactly one of `file` / `delayed` is given.
    pub fn validate(&self) -> Result<StartMode, RequestError> {
        match (&self.file, self.delayed) {
            (Some(_), true) => Err(RequestError::ArtifactWithDelayed),
            (None, false) => Err(RequestError::MissingArtifact),
            (None, true) => Ok(StartMode::Delayed),
            (Some(file), false) if file.trim().is_empty() => Err(RequestError::EmptyArtifact),
            (Some(file), false) => Ok(StartMode::Immediate(file.clone())),
        }
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
