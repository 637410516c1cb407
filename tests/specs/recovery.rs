// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recovery specs: a later invocation picks up where an earlier one left off

use crate::prelude::*;

#[test]
fn recover_waits_for_job_started_earlier() {
    let project = Project::empty();
    let marker = project.state_dir().with_file_name("runs");
    let job = project.script(
        "slow.sh",
        &format!("echo run >> {}\nsleep 1\necho done\n", marker.display()),
    );

    project.bj().args(&["submit", &job]).passes();

    project
        .bj()
        .args(&["recover", "--wait"])
        .passes()
        .stdout_has("1 success")
        .stdout_has("done");

    // Re-attached, never re-launched
    assert_eq!(std::fs::read_to_string(&marker).unwrap(), "run\n");
}

#[test]
fn recover_reports_finished_jobs() {
    let project = Project::empty();
    let ok = project.script("ok.sh", "exit 0\n");
    let bad = project.script("bad.sh", "exit 5\n");

    project.bj().args(&["submit", "--wait", &ok]).passes();
    project.bj().args(&["submit", "--wait", &bad]).fails_with(1);

    project
        .bj()
        .args(&["recover"])
        .passes()
        .stdout_has("1 success")
        .stdout_has("2 dead: exit code 5");
}

#[test]
fn recover_json_lines() {
    let project = Project::empty();
    let ok = project.script("ok.sh", "exit 0\n");
    project.bj().args(&["submit", "--wait", &ok]).passes();

    let out = project.bj().args(&["recover", "-o", "json"]).passes();
    let value: serde_json::Value = serde_json::from_str(out.stdout.trim()).unwrap();

    assert_eq!(value["id"], 1);
    assert_eq!(value["state"], "success");
}

#[test]
fn recover_with_nothing_persisted() {
    let project = Project::empty();
    project.bj().args(&["recover"]).passes().stdout_has("No sessions");
}
