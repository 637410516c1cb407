// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Helpers for driving the `bj` binary against a throwaway state dir.

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

/// `bj` with no state dir, for help and argument parsing specs.
pub fn cli() -> Cmd {
    Cmd::new(None)
}

/// A temporary state directory plus a place for job scripts.
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self { dir: tempfile::tempdir().unwrap() }
    }

    pub fn state_dir(&self) -> PathBuf {
        self.dir.path().join("state")
    }

    /// Write a job script and return its path.
    pub fn script(&self, name: &str, body: &str) -> String {
        let path = self.dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path.display().to_string()
    }

    pub fn bj(&self) -> Cmd {
        Cmd::new(Some(self.state_dir()))
    }
}

pub struct Cmd {
    cmd: Command,
}

impl Cmd {
    fn new(state_dir: Option<PathBuf>) -> Self {
        let mut cmd = Command::cargo_bin("bj").unwrap();
        for var in ["BJ_STATE_DIR", "BJ_LOG", "BJ_OWNER", "BJ_LOG_CAPACITY"] {
            cmd.env_remove(var);
        }
        cmd.env("BJ_POLL_MS", "20").env("USER", "spec").env("NO_COLOR", "1");
        if let Some(dir) = state_dir {
            cmd.arg("--state-dir").arg(dir);
        }
        Self { cmd }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn passes(mut self) -> Output {
        let out = Output::from(self.cmd.output().unwrap());
        assert_eq!(out.code, Some(0), "expected success\n{}", out);
        out
    }

    pub fn fails_with(mut self, code: i32) -> Output {
        let out = Output::from(self.cmd.output().unwrap());
        assert_eq!(out.code, Some(code), "expected exit code {}\n{}", code, out);
        out
    }
}

pub struct Output {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl From<std::process::Output> for Output {
    fn from(o: std::process::Output) -> Self {
        Self {
            code: o.status.code(),
            stdout: String::from_utf8_lossy(&o.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&o.stderr).into_owned(),
        }
    }
}

impl std::fmt::Display for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "--- stdout ---\n{}--- stderr ---\n{}", self.stdout, self.stderr)
    }
}

impl Output {
    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout.contains(needle), "stdout lacks {:?}\n{}", needle, self);
        self
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        assert!(!self.stdout.contains(needle), "stdout has {:?}\n{}", needle, self);
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr.contains(needle), "stderr lacks {:?}\n{}", needle, self);
        self
    }

    /// First whitespace-separated token of stdout.
    pub fn first_word(&self) -> String {
        self.stdout.split_whitespace().next().unwrap_or_default().to_string()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout).unwrap()
    }
}
