// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{AppTag, RecoveryMetadata, SessionId};

/// Proptest strategies for the session state machine.
pub mod strategies {
    use crate::app::AppOutcome;
    use crate::event::SessionEvent;
    use crate::state::{ExitMetadata, SessionState};
    use proptest::prelude::*;

    pub fn arb_outcome() -> impl Strategy<Value = AppOutcome> {
        prop_oneof![
            any::<Option<i32>>().prop_map(|exit_code| AppOutcome::Success { exit_code }),
            "[a-z ]{0,12}".prop_map(AppOutcome::Failure),
            Just(AppOutcome::Killed),
        ]
    }

    pub fn arb_event() -> impl Strategy<Value = SessionEvent> {
        prop_oneof![
            Just(SessionEvent::StartRequested),
            Just(SessionEvent::AppIdKnown),
            arb_outcome().prop_map(|outcome| SessionEvent::Finished { outcome }),
            "[a-z ]{0,12}".prop_map(|reason| SessionEvent::LaunchFailed { reason }),
            Just(SessionEvent::KillRequested),
        ]
    }

    pub fn arb_initial_state() -> impl Strategy<Value = SessionState> {
        prop_oneof![
            Just(SessionState::NotStarted),
            Just(SessionState::Starting),
            Just(SessionState::Recovering),
        ]
    }

    pub fn arb_state() -> impl Strategy<Value = SessionState> {
        prop_oneof![
            arb_initial_state(),
            Just(SessionState::Running),
            any::<Option<i32>>().prop_map(|exit_code| SessionState::Success(ExitMetadata { exit_code })),
            "[a-z ]{0,12}".prop_map(SessionState::Dead),
            Just(SessionState::Killed),
        ]
    }
}

/// Recovery record with the given id and tag and nothing else known.
pub fn recovery_record(id: u64, tag: &str) -> RecoveryMetadata {
    RecoveryMetadata::new(SessionId(id), AppTag::new(tag), "tester")
}
