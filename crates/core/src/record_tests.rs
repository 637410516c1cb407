// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn fresh_record_has_no_app_id() {
    let record = RecoveryMetadata::new(SessionId(3), AppTag::new("bj-batch-3-abc"), "alice");
    assert_eq!(record.version, CURRENT_RECORD_VERSION);
    assert!(record.app_id.is_none());
    assert!(record.artifact_location.is_empty());
    assert_eq!(record.owner, "alice");
}

#[test]
fn minimal_record_serializes_without_optional_fields() {
    let record = RecoveryMetadata::new(SessionId(7), AppTag::new("tag"), "bob")
        .artifact_location("/tmp/job.sh");
    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(
        value,
        json!({
            "v": 1,
            "id": 7,
            "app_tag": "tag",
            "artifact_location": "/tmp/job.sh",
            "owner": "bob",
        })
    );
}

#[test]
fn missing_app_id_decodes_to_none() {
    let record = RecoveryMetadata::decode(br#"{"id":99,"app_tag":"appTag"}"#).unwrap();
    assert_eq!(record.id, SessionId(99));
    assert_eq!(record.app_tag.as_str(), "appTag");
    assert_eq!(record.app_id, None);
    assert_eq!(record.version, CURRENT_RECORD_VERSION);
    assert!(record.app_info.is_empty());
    assert!(record.args.is_empty());
}

#[test]
fn full_record_keeps_every_field() {
    let record = RecoveryMetadata::new(SessionId(1), AppTag::new("t"), "o")
        .app_id("local-42")
        .name("nightly")
        .args(vec!["a".into(), "b".into()])
        .app_info(AppInfo::new(Some("file:///log".into()), None));
    let decoded = RecoveryMetadata::decode(&record.encode().unwrap()).unwrap();
    assert_eq!(decoded, record);
}

#[test]
fn unknown_fields_are_tolerated() {
    let record =
        RecoveryMetadata::decode(br#"{"v":1,"id":1,"app_tag":"t","queue":"default"}"#).unwrap();
    assert_eq!(record.id, SessionId(1));
}
