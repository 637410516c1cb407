// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable recovery record for a batch session.
//!
//! The record is the only state that survives a restart. It is rewritten in
//! full whenever the application id, application info, artifact location or
//! final state changes.

use crate::app::AppInfo;
use crate::id::{AppTag, SessionId};
use serde::{Deserialize, Serialize};

/// Store namespace for batch session records.
pub const BATCH_SESSION_TYPE: &str = "batch";

/// Schema version written by this build.
pub const CURRENT_RECORD_VERSION: u32 = 1;

fn current_version() -> u32 {
    CURRENT_RECORD_VERSION
}

/// Serializable snapshot of a session, enough to re-attach after a restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryMetadata {
    #[serde(rename = "v", default = "current_version")]
    pub version: u32,
    pub id: SessionId,
    pub app_tag: AppTag,
    /// Engine application id; absent until the engine reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default)]
    pub artifact_location: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "AppInfo::is_empty")]
    pub app_info: AppInfo,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl RecoveryMetadata {
    pub fn new(id: SessionId, app_tag: AppTag, owner: impl Into<String>) -> Self {
        Self {
            version: CURRENT_RECORD_VERSION,
            id,
            app_tag,
            app_id: None,
            artifact_location: String::new(),
            owner: owner.into(),
            name: None,
            app_info: AppInfo::default(),
            args: Vec::new(),
        }
    }

    crate::setters! {
        into {
            artifact_location: String,
        }
        set {
            app_info: AppInfo,
            args: Vec<String>,
        }
        option {
            app_id: String,
            name: String,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
