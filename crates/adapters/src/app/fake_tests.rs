// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use bj_core::{AppInfo, AppOutcome, SessionId};

struct NullListener;

impl AppListener for NullListener {
    fn app_id_known(&self, _app_id: &str) {}
    fn info_changed(&self, _info: &AppInfo) {}
    fn finished(&self, _outcome: AppOutcome) {}
}

#[tokio::test]
async fn records_launch_and_keeps_listener() {
    let launcher = FakeLauncher::new();
    let tag = AppTag::new("t");
    let spec = LaunchSpec::new(SessionId(1), tag.clone(), "job.sh");

    let handle = launcher
        .launch(spec, Arc::new(NullListener), Arc::new(LogBuffer::default()))
        .await
        .unwrap();

    assert_eq!(handle.app_tag(), &tag);
    assert_eq!(launcher.launch_count(), 1);
    assert!(launcher.listener(&tag).is_some());
    assert!(launcher.log(&tag).is_some());
}

#[tokio::test]
async fn injected_launch_failure() {
    let launcher = FakeLauncher::new();
    launcher.fail_launches(Some("engine rejected"));
    let spec = LaunchSpec::new(SessionId(1), AppTag::new("t"), "job.sh");

    let err = launcher
        .launch(spec, Arc::new(NullListener), Arc::new(LogBuffer::default()))
        .await
        .err()
        .unwrap();

    assert_eq!(err.to_string(), "launch failed: engine rejected");
    assert!(launcher.listener(&AppTag::new("t")).is_none());
}

#[tokio::test]
async fn kills_are_counted_per_handle() {
    let launcher = FakeLauncher::new();
    let a = launcher.handle(AppTag::new("a"));
    let b = launcher.handle(AppTag::new("b"));

    assert!(a.kill().await.unwrap());
    launcher.exit_before_kill(true);
    assert!(!a.kill().await.unwrap());

    assert_eq!(a.kill_count(), 2);
    assert_eq!(b.kill_count(), 0);
}

#[tokio::test]
async fn missing_attach() {
    let launcher = FakeLauncher::new();
    launcher.fail_attaches(true);
    let spec = AttachSpec { session_id: SessionId(9), app_tag: AppTag::new("t"), app_id: None };

    let result =
        launcher.attach(spec, Arc::new(NullListener), Arc::new(LogBuffer::default())).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(
        launcher.calls(),
        vec![LauncherCall::Attach { app_tag: AppTag::new("t"), app_id: None }]
    );
}
