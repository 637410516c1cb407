// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use bj_core::{AppInfo, AppOutcome, SessionId};
use parking_lot::Mutex;
use std::time::Instant;
use tempfile::{tempdir, TempDir};

#[derive(Debug, Clone, PartialEq)]
enum Note {
    AppId(String),
    Info(AppInfo),
    Finished(AppOutcome),
}

#[derive(Default)]
struct RecordingListener {
    notes: Mutex<Vec<Note>>,
}

impl RecordingListener {
    fn notes(&self) -> Vec<Note> {
        self.notes.lock().clone()
    }

    fn outcome(&self) -> Option<AppOutcome> {
        self.notes.lock().iter().find_map(|n| match n {
            Note::Finished(o) => Some(o.clone()),
            _ => None,
        })
    }

    async fn wait_finished(&self) -> AppOutcome {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(outcome) = self.outcome() {
                return outcome;
            }
            assert!(Instant::now() < deadline, "application did not finish: {:?}", self.notes());
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    async fn wait_app_id(&self) -> String {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            let found = self.notes.lock().iter().find_map(|n| match n {
                Note::AppId(id) => Some(id.clone()),
                _ => None,
            });
            if let Some(id) = found {
                return id;
            }
            assert!(Instant::now() < deadline, "no application id reported");
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

impl AppListener for RecordingListener {
    fn app_id_known(&self, app_id: &str) {
        self.notes.lock().push(Note::AppId(app_id.to_string()));
    }

    fn info_changed(&self, info: &AppInfo) {
        self.notes.lock().push(Note::Info(info.clone()));
    }

    fn finished(&self, outcome: AppOutcome) {
        self.notes.lock().push(Note::Finished(outcome));
    }
}

struct Fixture {
    dir: TempDir,
    launcher: LocalLauncher,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let launcher =
            LocalLauncher::new(dir.path().join("apps")).with_poll_interval(Duration::from_millis(20));
        Self { dir, launcher }
    }

    fn script(&self, name: &str, body: &str) -> String {
        let path = self.dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path.display().to_string()
    }

    fn spec(&self, tag: &str, artifact: String) -> LaunchSpec {
        LaunchSpec::new(SessionId(1), AppTag::new(tag), artifact)
    }

    fn second_launcher(&self) -> LocalLauncher {
        LocalLauncher::new(self.dir.path().join("apps")).with_poll_interval(Duration::from_millis(20))
    }
}

#[tokio::test]
async fn launch_runs_artifact_and_reports_success() {
    let fx = Fixture::new();
    let artifact = fx.script("hello.sh", "echo hello world\n");
    let listener = Arc::new(RecordingListener::default());
    let log = Arc::new(LogBuffer::new(10));

    let handle = fx.launcher.launch(fx.spec("t-ok", artifact), listener.clone(), log.clone()).await.unwrap();

    assert_eq!(handle.app_tag().as_str(), "t-ok");
    assert_eq!(listener.wait_finished().await, AppOutcome::Success { exit_code: Some(0) });
    assert!(log.snapshot().contains(&"hello world".to_string()));
    let app_id = listener.wait_app_id().await;
    assert!(app_id.starts_with("local-"));
}

#[tokio::test]
async fn arguments_and_conf_reach_the_artifact() {
    let fx = Fixture::new();
    let artifact = fx.script("args.sh", "echo \"$1-$2\"\necho \"mem=$BJ_CONF_SPARK_EXECUTOR_MEMORY\"\n");
    let listener = Arc::new(RecordingListener::default());
    let log = Arc::new(LogBuffer::new(10));
    let spec = fx
        .spec("t-args", artifact)
        .args(vec!["a".into(), "b".into()])
        .conf([("spark.executor.memory".to_string(), "2g".to_string())].into());

    fx.launcher.launch(spec, listener.clone(), log.clone()).await.unwrap();
    listener.wait_finished().await;

    assert_eq!(log.snapshot(), vec!["a-b", "mem=2g"]);
}

#[tokio::test]
async fn nonzero_exit_is_a_failure() {
    let fx = Fixture::new();
    let artifact = fx.script("fail.sh", "echo boom >&2\nexit 3\n");
    let listener = Arc::new(RecordingListener::default());
    let log = Arc::new(LogBuffer::new(10));

    fx.launcher.launch(fx.spec("t-fail", artifact), listener.clone(), log.clone()).await.unwrap();

    assert_eq!(listener.wait_finished().await, AppOutcome::Failure("exit code 3".into()));
    assert_eq!(log.snapshot(), vec!["boom"]);
}

#[tokio::test]
async fn missing_artifact_fails_launch() {
    let fx = Fixture::new();
    let listener = Arc::new(RecordingListener::default());
    let result = fx
        .launcher
        .launch(fx.spec("t-missing", "/no/such/job.sh".into()), listener.clone(), Arc::new(LogBuffer::default()))
        .await;

    assert!(matches!(result, Err(AppError::LaunchFailed(_))));
    assert!(listener.notes().is_empty());
}

#[tokio::test]
async fn file_uri_artifacts_are_accepted() {
    let fx = Fixture::new();
    let artifact = format!("file://{}", fx.script("uri.sh", "exit 0\n"));
    let listener = Arc::new(RecordingListener::default());

    fx.launcher.launch(fx.spec("t-uri", artifact), listener.clone(), Arc::new(LogBuffer::default())).await.unwrap();

    assert_eq!(listener.wait_finished().await, AppOutcome::Success { exit_code: Some(0) });
}

#[tokio::test]
async fn kill_reports_killed() {
    let fx = Fixture::new();
    let artifact = fx.script("sleep.sh", "echo started\nsleep 30\n");
    let listener = Arc::new(RecordingListener::default());
    let log = Arc::new(LogBuffer::new(10));

    let handle = fx.launcher.launch(fx.spec("t-kill", artifact), listener.clone(), log).await.unwrap();
    listener.wait_app_id().await;
    assert!(handle.kill().await.unwrap());

    assert_eq!(listener.wait_finished().await, AppOutcome::Killed);
}

#[tokio::test]
async fn kill_after_exit_signals_nothing() {
    let fx = Fixture::new();
    let artifact = fx.script("quick.sh", "exit 0\n");
    let listener = Arc::new(RecordingListener::default());

    let spec = fx.spec("t-late-kill", artifact);
    let dir = AppDir::new(fx.launcher.apps_dir(), &spec.app_tag);
    let handle = fx.launcher.launch(spec, listener.clone(), Arc::new(LogBuffer::default())).await.unwrap();
    assert_eq!(listener.wait_finished().await, AppOutcome::Success { exit_code: Some(0) });

    assert!(!handle.kill().await.unwrap());
    assert!(!dir.is_killed());
}

#[tokio::test]
async fn attach_to_unknown_tag_is_not_found() {
    let fx = Fixture::new();
    let spec = AttachSpec { session_id: SessionId(1), app_tag: AppTag::new("nope"), app_id: None };
    let result = fx
        .launcher
        .attach(spec, Arc::new(RecordingListener::default()), Arc::new(LogBuffer::default()))
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn attach_to_finished_app_reports_finished_before_app_id() {
    let fx = Fixture::new();
    let artifact = fx.script("quick.sh", "echo done\n");
    let first = Arc::new(RecordingListener::default());
    fx.launcher.launch(fx.spec("t-done", artifact), first.clone(), Arc::new(LogBuffer::default())).await.unwrap();
    first.wait_finished().await;

    let second = Arc::new(RecordingListener::default());
    let log = Arc::new(LogBuffer::new(10));
    let spec = AttachSpec { session_id: SessionId(1), app_tag: AppTag::new("t-done"), app_id: None };
    fx.second_launcher().attach(spec, second.clone(), log.clone()).await.unwrap();
    second.wait_finished().await;
    second.wait_app_id().await;

    let notes = second.notes();
    assert!(matches!(notes[0], Note::Finished(AppOutcome::Success { .. })));
    assert!(matches!(notes[1], Note::AppId(_)));
    assert_eq!(log.snapshot(), vec!["done"]);
}

#[tokio::test]
async fn shutdown_leaves_app_running_for_reattach() {
    let fx = Fixture::new();
    let artifact = fx.script("slow.sh", "sleep 1\necho finished late\n");
    let first = Arc::new(RecordingListener::default());
    fx.launcher.launch(fx.spec("t-slow", artifact), first.clone(), Arc::new(LogBuffer::default())).await.unwrap();
    let app_id = first.wait_app_id().await;
    fx.launcher.shutdown();

    let second = Arc::new(RecordingListener::default());
    let log = Arc::new(LogBuffer::new(10));
    let spec = AttachSpec {
        session_id: SessionId(1),
        app_tag: AppTag::new("t-slow"),
        app_id: Some(app_id.clone()),
    };
    fx.second_launcher().attach(spec, second.clone(), log.clone()).await.unwrap();

    assert_eq!(second.wait_finished().await, AppOutcome::Success { exit_code: Some(0) });
    assert_eq!(second.notes()[0], Note::AppId(app_id));
    assert!(log.snapshot().contains(&"finished late".to_string()));
    assert!(first.outcome().is_none());
}

#[yare::parameterized(
    dotted = { "spark.executor.memory", "BJ_CONF_SPARK_EXECUTOR_MEMORY" },
    dashed = { "queue-name", "BJ_CONF_QUEUE_NAME" },
    plain  = { "x", "BJ_CONF_X" },
)]
fn conf_names(key: &str, expected: &str) {
    assert_eq!(conf_env_name(key), expected);
}

#[test]
fn app_id_format() {
    assert_eq!(local_app_id(4242), "local-4242");
}
