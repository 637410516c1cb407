// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bj submit` - Launch a batch job

use super::{finish_all, report, settle, WaitArgs};
use crate::output::OutputFormat;
use anyhow::{Context, Result};
use bj_core::{BatchRequest, SessionStateKind};
use bj_engine::{BatchSession, SessionManager};
use clap::Args;
use std::path::Path;

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Job artifact (path or file:// URI)
    pub file: String,

    /// Arguments passed to the artifact
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Label for the session
    #[arg(long)]
    pub name: Option<String>,

    /// Owner recorded on the session (default: configured owner)
    #[arg(long)]
    pub owner: Option<String>,

    /// Engine configuration entry, repeatable
    #[arg(long = "conf", value_name = "KEY=VALUE", value_parser = parse_conf)]
    pub conf: Vec<(String, String)>,

    /// Copy the artifact into the state directory before launching
    #[arg(long)]
    pub stage: bool,

    #[command(flatten)]
    pub wait: WaitArgs,
}

pub fn parse_conf(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

pub async fn handle(manager: &SessionManager, args: SubmitArgs, format: OutputFormat) -> Result<()> {
    let base = if args.stage { BatchRequest::delayed() } else { BatchRequest::file(&args.file) };
    let mut request = base
        .args(args.args)
        .conf(args.conf.into_iter().collect());
    if let Some(name) = args.name {
        request = request.name(name);
    }
    if let Some(owner) = args.owner {
        request = request.owner(owner);
    }

    let session = manager.submit(request).await?;
    let session = if args.stage {
        match stage(&session, &args.file).await {
            Ok(started) => started,
            Err(e) => {
                manager.delete(session.id()).await?;
                return Err(e);
            }
        }
    } else {
        session
    };

    settle(&session, SessionStateKind::Starting).await;
    if args.wait.wait {
        return finish_all(std::slice::from_ref(&session), &args.wait, format).await;
    }
    match format {
        OutputFormat::Text => println!("{}", session.id()),
        OutputFormat::Json => report(&session, &session.state(), format)?,
    }
    Ok(())
}

/// Upload a local file into a delayed session and start it.
async fn stage(session: &BatchSession, file: &str) -> Result<BatchSession> {
    let path = Path::new(file.strip_prefix("file://").unwrap_or(file));
    let reader = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("failed to open artifact {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    session.set_file(reader, &file_name).await?;
    Ok(session.start_delayed().await?)
}

#[cfg(test)]
#[path = "submit_tests.rs"]
mod tests;
