// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bj list` - Show persisted sessions

use crate::output::{self, OutputFormat};
use anyhow::Result;
use bj_engine::SessionManager;

pub fn handle(manager: &SessionManager, format: OutputFormat) -> Result<()> {
    let records = manager.records()?;
    match format {
        OutputFormat::Text => print!("{}", output::format_records(&records)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
    }
    Ok(())
}
