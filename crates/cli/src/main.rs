// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bj - batch session manager CLI

mod commands;
mod exit_error;
mod logging;
mod output;

use anyhow::{Context, Result};
use bj_engine::{EngineConfig, SessionManager};
use clap::{Parser, Subcommand};
use commands::{kill, list, recover, submit};
use exit_error::ExitError;
use output::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bj", version, about = "Launch, track and recover batch jobs")]
struct Cli {
    /// State directory (default: $BJ_STATE_DIR, then $XDG_STATE_HOME/bj)
    #[arg(long, global = true, value_name = "DIR")]
    state_dir: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch a batch job and print its session id
    Submit(submit::SubmitArgs),
    /// Re-attach to every persisted session
    Recover(recover::RecoverArgs),
    /// List persisted sessions
    List,
    /// Kill a session's application
    Kill(kill::KillArgs),
}

fn main() {
    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(()) => 0,
        Err(e) => match e.downcast_ref::<ExitError>() {
            Some(exit) => {
                if !exit.message.is_empty() {
                    eprintln!("{}", exit.message);
                }
                exit.code
            }
            None => {
                eprintln!("error: {:#}", e);
                1
            }
        },
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<()> {
    let config = match cli.state_dir {
        Some(ref dir) => EngineConfig::load_from(dir),
        None => EngineConfig::load(),
    }?;
    let _log_guard = logging::init(&config.log_path(), cli.verbose)?;

    let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
    runtime.block_on(async {
        let (manager, launcher) = SessionManager::open_local(config)?;
        let result = dispatch(&manager, cli.command, cli.output).await;
        // Applications keep running; only our monitors stop
        launcher.shutdown();
        result
    })
}

async fn dispatch(manager: &SessionManager, command: Commands, format: OutputFormat) -> Result<()> {
    match command {
        Commands::Submit(args) => submit::handle(manager, args, format).await,
        Commands::Recover(args) => recover::handle(manager, args, format).await,
        Commands::List => list::handle(manager, format),
        Commands::Kill(args) => kill::handle(manager, args, format).await,
    }
}
