// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bj kill` - Kill a session's application

use super::{report, settle};
use crate::output::OutputFormat;
use anyhow::Result;
use bj_core::{SessionId, SessionStateKind};
use bj_engine::SessionManager;
use clap::Args;

#[derive(Args, Debug)]
pub struct KillArgs {
    /// Session ID
    pub id: SessionId,
}

pub async fn handle(manager: &SessionManager, args: KillArgs, format: OutputFormat) -> Result<()> {
    let session = manager.recover(args.id).await?;
    // Kill needs the re-attached handle, or the application outlives us
    settle(&session, SessionStateKind::Recovering).await;

    let state = manager.kill(args.id).await?;
    report(&session, &state, format)
}
