// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn file_request_starts_immediately() {
    let request = BatchRequest::file("/jobs/wordcount.sh");
    assert_eq!(
        request.validate(),
        Ok(StartMode::Immediate("/jobs/wordcount.sh".to_string()))
    );
}

#[test]
fn delayed_request_waits_for_upload() {
    assert_eq!(BatchRequest::delayed().validate(), Ok(StartMode::Delayed));
}

#[yare::parameterized(
    neither = { None, false, RequestError::MissingArtifact },
    both    = { Some("job.sh"), true, RequestError::ArtifactWithDelayed },
    blank   = { Some("  "), false, RequestError::EmptyArtifact },
)]
fn invalid_requests(file: Option<&str>, delayed: bool, expected: RequestError) {
    let request = BatchRequest { file: file.map(String::from), delayed, ..BatchRequest::default() };
    assert_eq!(request.validate(), Err(expected));
}

#[test]
fn setters_chain() {
    let request = BatchRequest::file("job.sh")
        .args(vec!["--rows".into(), "10".into()])
        .name("nightly")
        .owner("alice");
    assert_eq!(request.args, vec!["--rows", "10"]);
    assert_eq!(request.name.as_deref(), Some("nightly"));
    assert_eq!(request.owner.as_deref(), Some("alice"));
}

#[test]
fn request_deserializes_with_defaults() {
    let request: BatchRequest = serde_json::from_str(r#"{"delayed":true}"#).unwrap();
    assert!(request.delayed);
    assert!(request.file.is_none());
    assert!(request.args.is_empty());
    assert!(request.conf.is_empty());
}
