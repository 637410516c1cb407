// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session and application identifiers.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Unique identifier for a batch session.
///
/// Assigned when a session is created (or restored from its recovery
/// record) and never changes afterwards.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl SessionId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// The id following this one (saturating).
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SessionId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for SessionId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self)
    }
}

const TAG_ALPHABET: [char; 36] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

/// Stable tag correlating a session with its cluster application.
///
/// The tag is handed to the engine at launch and persisted in the recovery
/// record, so a restarted service can find the same application again.
/// Generated tags look like `bj-batch-7-k3v9q0xa`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppTag(String);

impl AppTag {
    pub const PREFIX: &'static str = "bj-batch-";

    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Generate a fresh tag for a session.
    pub fn generate(id: SessionId) -> Self {
        Self(format!("{}{}-{}", Self::PREFIX, id, nanoid::nanoid!(8, &TAG_ALPHABET)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AppTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppTag {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AppTag {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for AppTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for AppTag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for AppTag {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for AppTag {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
