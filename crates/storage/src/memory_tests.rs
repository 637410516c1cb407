// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use bj_core::test_support::recovery_record;
use bj_core::BATCH_SESSION_TYPE;

#[test]
fn records_every_save() {
    let store = MemorySessionStore::new();
    let record = recovery_record(1, "t");
    store.save(BATCH_SESSION_TYPE, &record).unwrap();
    store.save(BATCH_SESSION_TYPE, &record).unwrap();

    let saves = store.saves();
    assert_eq!(saves.len(), 2);
    assert!(saves.iter().all(|s| s.record_type == BATCH_SESSION_TYPE));
    assert_eq!(store.get_all(BATCH_SESSION_TYPE).unwrap(), vec![record]);
}

#[test]
fn injected_failures_keep_previous_record() {
    let store = MemorySessionStore::new();
    store.save(BATCH_SESSION_TYPE, &recovery_record(1, "t")).unwrap();
    store.fail_saves(true);

    let err = store.save(BATCH_SESSION_TYPE, &recovery_record(1, "t").app_id("x")).unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));
    assert_eq!(store.save_count(), 2);
    let saved = store.get(BATCH_SESSION_TYPE, SessionId(1)).unwrap().unwrap();
    assert_eq!(saved.app_id, None);
}

#[test]
fn ids_are_allocated_per_record_type() {
    let store = MemorySessionStore::new();
    assert_eq!(store.next_session_id("batch").unwrap(), SessionId(1));
    assert_eq!(store.next_session_id("batch").unwrap(), SessionId(2));
    assert_eq!(store.next_session_id("interactive").unwrap(), SessionId(1));
}

#[test]
fn remove_drops_record() {
    let store = MemorySessionStore::new();
    store.save(BATCH_SESSION_TYPE, &recovery_record(3, "t")).unwrap();
    assert!(store.remove(BATCH_SESSION_TYPE, SessionId(3)).unwrap());
    assert!(store.get_all(BATCH_SESSION_TYPE).unwrap().is_empty());
}
