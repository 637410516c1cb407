// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI help and argument specs

use crate::prelude::*;

#[test]
fn bj_help_lists_commands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("Usage:")
        .stdout_has("submit")
        .stdout_has("recover")
        .stdout_has("list")
        .stdout_has("kill");
}

#[test]
fn bj_submit_help_shows_wait() {
    cli().args(&["submit", "--help"]).passes().stdout_has("--wait").stdout_has("--stage");
}

#[test]
fn bj_version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.1");
}

#[test]
fn timeout_requires_wait() {
    cli().args(&["submit", "--timeout", "5", "job.sh"]).fails_with(2).stderr_has("--wait");
}

#[test]
fn bad_conf_entry_is_rejected() {
    cli().args(&["submit", "--conf", "nokey", "job.sh"]).fails_with(2).stderr_has("KEY=VALUE");
}
