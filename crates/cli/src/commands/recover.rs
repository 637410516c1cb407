// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bj recover` - Re-attach to persisted sessions

use super::{finish_all, report, settle, WaitArgs};
use crate::output::OutputFormat;
use anyhow::Result;
use bj_core::SessionStateKind;
use bj_engine::SessionManager;
use clap::Args;

#[derive(Args, Debug)]
pub struct RecoverArgs {
    #[command(flatten)]
    pub wait: WaitArgs,
}

pub async fn handle(manager: &SessionManager, args: RecoverArgs, format: OutputFormat) -> Result<()> {
    let sessions = manager.recover_all().await?;
    if sessions.is_empty() {
        if format == OutputFormat::Text {
            println!("No sessions");
        }
        return Ok(());
    }

    for session in &sessions {
        settle(session, SessionStateKind::Recovering).await;
    }
    if args.wait.wait {
        return finish_all(&sessions, &args.wait, format).await;
    }
    for session in &sessions {
        report(session, &session.state(), format)?;
    }
    Ok(())
}
