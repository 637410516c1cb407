// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Application notifications applied to a session.

use super::Inner;
use bj_adapters::AppListener;
use bj_core::{AppInfo, AppOutcome, SessionEvent};
use std::sync::{Arc, Weak};

/// Listener handed to the launcher.
///
/// Holds the session weakly so a monitor task never keeps a dropped
/// session alive.
pub(super) struct SessionListener {
    session: Weak<Inner>,
}

impl SessionListener {
    pub(super) fn new(inner: &Arc<Inner>) -> Self {
        Self { session: Arc::downgrade(inner) }
    }
}

impl AppListener for SessionListener {
    fn app_id_known(&self, app_id: &str) {
        if let Some(inner) = self.session.upgrade() {
            inner.app_id_known(app_id);
        }
    }

    fn info_changed(&self, info: &AppInfo) {
        if let Some(inner) = self.session.upgrade() {
            inner.info_changed(info);
        }
    }

    fn finished(&self, outcome: AppOutcome) {
        if let Some(inner) = self.session.upgrade() {
            inner.finished(outcome);
        }
    }
}

impl Inner {
    /// Record the application id (write-once) and move to `Running`.
    pub(super) fn app_id_known(&self, app_id: &str) {
        {
            let mut core = self.core.lock();
            match core.app_id.as_deref() {
                None => core.app_id = Some(app_id.to_string()),
                Some(existing) if existing == app_id => {}
                Some(existing) => {
                    tracing::warn!(
                        session_id = %self.id,
                        existing,
                        reported = app_id,
                        "conflicting application id reported, keeping the first"
                    );
                }
            }
            let _ = self.apply_locked(&mut core, SessionEvent::AppIdKnown);
        }
        self.persist_logged("app_id_known");
    }

    /// Merge non-empty links into the application info.
    pub(super) fn info_changed(&self, info: &AppInfo) {
        let changed = self.core.lock().app_info.merge(info);
        if changed {
            tracing::debug!(session_id = %self.id, ?info, "application info changed");
        }
        self.persist_logged("info_changed");
    }

    /// Final status from the application; the first one wins.
    pub(super) fn finished(&self, outcome: AppOutcome) {
        if !self.apply(SessionEvent::Finished { outcome: outcome.clone() }) {
            tracing::debug!(session_id = %self.id, %outcome, "duplicate or late finish ignored");
        }
        self.persist_logged("finished");
    }
}
