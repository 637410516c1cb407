// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Submit, wait and kill specs against the local process engine

use crate::prelude::*;

#[test]
fn submit_and_wait_reports_success_with_output() {
    let project = Project::empty();
    let job = project.script("hello.sh", "echo hello world\n");

    project
        .bj()
        .args(&["submit", "--wait", &job])
        .passes()
        .stdout_has("1 success")
        .stdout_has("hello world");
}

#[test]
fn submit_without_wait_prints_id_and_persists() {
    let project = Project::empty();
    let job = project.script("quick.sh", "exit 0\n");

    let out = project.bj().args(&["submit", "--name", "quick", &job]).passes();
    assert_eq!(out.stdout.trim(), "1");

    project
        .bj()
        .args(&["list"])
        .passes()
        .stdout_has("local-")
        .stdout_has("quick")
        .stdout_has("spec");
}

#[test]
fn ids_increase_across_invocations() {
    let project = Project::empty();
    let job = project.script("quick.sh", "exit 0\n");

    project.bj().args(&["submit", &job]).passes();
    let out = project.bj().args(&["submit", &job]).passes();

    assert_eq!(out.stdout.trim(), "2");
}

#[test]
fn failing_job_exits_nonzero() {
    let project = Project::empty();
    let job = project.script("fail.sh", "echo boom\nexit 3\n");

    project
        .bj()
        .args(&["submit", "--wait", &job])
        .fails_with(1)
        .stdout_has("dead: exit code 3")
        .stdout_has("boom")
        .stderr_has("session ended dead");
}

#[test]
fn missing_artifact_is_dead() {
    let project = Project::empty();

    project
        .bj()
        .args(&["submit", "--wait", "/no/such/job.sh"])
        .fails_with(1)
        .stdout_has("launch failed");
}

#[test]
fn args_and_conf_reach_the_job() {
    let project = Project::empty();
    let job = project.script(
        "args.sh",
        "echo \"args $1 $2\"\necho \"mem $BJ_CONF_SPARK_EXECUTOR_MEMORY\"\n",
    );

    project
        .bj()
        .args(&["submit", "--wait", "--conf", "spark.executor.memory=2g", &job, "x", "--y"])
        .passes()
        .stdout_has("args x --y")
        .stdout_has("mem 2g");
}

#[test]
fn staged_artifact_runs_from_state_dir() {
    let project = Project::empty();
    let job = project.script("staged.sh", "echo staged run\n");

    project.bj().args(&["submit", "--stage", "--wait", &job]).passes().stdout_has("staged run");

    let records = project.bj().args(&["list", "-o", "json"]).passes().json();
    let location = records[0]["artifact_location"].as_str().unwrap().to_string();
    assert!(location.starts_with(&project.state_dir().display().to_string()), "{}", location);
    assert!(location.ends_with("uploads/1/staged.sh"), "{}", location);
}

#[test]
fn wait_timeout_exits_two() {
    let project = Project::empty();
    let job = project.script("slow.sh", "sleep 30\n");

    let out = project.bj().args(&["submit", "--wait", "--timeout", "1", &job]).fails_with(2);
    assert!(out.stderr.contains("timed out"), "{}", out);

    project.bj().args(&["kill", "1"]).passes().stdout_has("1 killed");
}

#[test]
fn kill_running_job() {
    let project = Project::empty();
    let job = project.script("sleep.sh", "echo started\nsleep 30\n");

    let id = project.bj().args(&["submit", &job]).passes().first_word();

    project.bj().args(&["kill", &id]).passes().stdout_has("killed");
    // Already killed: reported unchanged
    project.bj().args(&["kill", &id]).passes().stdout_has("killed");
}

#[test]
fn kill_unknown_session_fails() {
    let project = Project::empty();
    project.bj().args(&["kill", "42"]).fails_with(1).stderr_has("session not found: 42");
}

#[test]
fn list_empty_state() {
    let project = Project::empty();
    project.bj().args(&["list"]).passes().stdout_has("No sessions");
}
