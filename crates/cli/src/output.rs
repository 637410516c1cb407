// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use bj_core::{RecoveryMetadata, SessionState};
use clap::ValueEnum;
use std::fmt::Write;

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Render persisted records as an aligned table.
pub fn format_records(records: &[RecoveryMetadata]) -> String {
    if records.is_empty() {
        return "No sessions\n".to_string();
    }

    let rows: Vec<[String; 5]> = records
        .iter()
        .map(|r| {
            [
                r.id.to_string(),
                r.app_id.clone().unwrap_or_else(|| "-".to_string()),
                r.owner.clone(),
                r.name.clone().unwrap_or_else(|| "-".to_string()),
                or_dash(&r.artifact_location),
            ]
        })
        .collect();
    let headers = ["ID", "APP ID", "OWNER", "NAME", "ARTIFACT"];
    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &headers.map(String::from), &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let mut line = String::new();
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i + 1 == cells.len() {
            line.push_str(cell);
        } else {
            let _ = write!(line, "{:<width$}  ", cell, width = width);
        }
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

fn or_dash(s: &str) -> String {
    if s.is_empty() {
        "-".to_string()
    } else {
        s.to_string()
    }
}

/// One-line summary of a session's state: `<id> <state>`.
pub fn state_line(id: impl std::fmt::Display, state: &SessionState) -> String {
    format!("{} {}", id, state)
}

/// JSON object describing a session's state and recent output.
pub fn session_json(
    record: &RecoveryMetadata,
    state: &SessionState,
    log: &[String],
) -> serde_json::Value {
    serde_json::json!({
        "id": record.id,
        "app_tag": record.app_tag,
        "app_id": record.app_id,
        "state": state.kind(),
        "detail": state.to_string(),
        "log": log,
    })
}
