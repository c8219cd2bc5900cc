//! `groupsync status`: last sync result per pair.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use groupsync_core::{pairs, GroupPair};
use groupsync_engine::{report_store, SyncReport};

use super::home_dir;

/// Arguments for `groupsync status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let home = home_dir()?;
        let pairs = pairs::list_pairs_at(&home).context("failed to load pair configs")?;
        let rows = build_rows(&home, pairs)?;

        if self.json {
            print_json(rows)?;
            return Ok(());
        }
        print_table(rows);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    NeverSynced,
    Clean,
    Partial,
}

#[derive(Debug)]
struct PairStatus {
    pair: GroupPair,
    state: State,
    report: Option<SyncReport>,
}

#[derive(Serialize)]
struct PairStatusJson {
    pair: String,
    direction: String,
    local_group: String,
    remote_group: String,
    state: &'static str,
    last_sync_at: Option<String>,
    applied: usize,
    failed: usize,
    unresolved: usize,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "pair")]
    pair: String,
    #[tabled(rename = "direction")]
    direction: String,
    #[tabled(rename = "state")]
    state: String,
    #[tabled(rename = "last sync")]
    last_sync: String,
    #[tabled(rename = "applied")]
    applied: usize,
    #[tabled(rename = "failed")]
    failed: usize,
    #[tabled(rename = "unresolved")]
    unresolved: usize,
}

fn build_rows(home: &Path, pairs: Vec<GroupPair>) -> Result<Vec<PairStatus>> {
    pairs
        .into_iter()
        .map(|pair| {
            let report = report_store::load_at(home, &pair.name)
                .with_context(|| format!("failed to load last report for '{}'", pair.name))?;
            let state = match &report {
                None => State::NeverSynced,
                Some(r) if r.is_clean() => State::Clean,
                Some(_) => State::Partial,
            };
            Ok(PairStatus {
                pair,
                state,
                report,
            })
        })
        .collect()
}

fn counts(report: Option<&SyncReport>) -> (usize, usize, usize) {
    report.map_or((0, 0, 0), |r| {
        (r.applied(), r.failures().count(), r.unresolved.len())
    })
}

fn print_json(rows: Vec<PairStatus>) -> Result<()> {
    let payload: Vec<PairStatusJson> = rows
        .into_iter()
        .map(|row| {
            let (applied, failed, unresolved) = counts(row.report.as_ref());
            PairStatusJson {
                pair: row.pair.name.0,
                direction: row.pair.direction.to_string(),
                local_group: row.pair.local_group.0,
                remote_group: row.pair.remote_group.0,
                state: state_key(row.state),
                last_sync_at: row.report.map(|r| r.finished_at.to_rfc3339()),
                applied,
                failed,
                unresolved,
            }
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
    );
    Ok(())
}

fn print_table(rows: Vec<PairStatus>) {
    let partial = rows.iter().filter(|r| r.state == State::Partial).count();
    println!(
        "groupsync v{} | {} pairs | {} partial",
        env!("CARGO_PKG_VERSION"),
        rows.len(),
        partial,
    );

    if rows.is_empty() {
        println!("No pairs configured.");
        return;
    }

    let table_rows: Vec<StatusTableRow> = rows
        .iter()
        .map(|row| {
            let (applied, failed, unresolved) = counts(row.report.as_ref());
            StatusTableRow {
                pair: row.pair.name.0.clone(),
                direction: row.pair.direction.to_string(),
                state: state_label(row.state),
                last_sync: row
                    .report
                    .as_ref()
                    .map_or_else(|| "never".to_string(), |r| format_age(r.finished_at)),
                applied,
                failed,
                unresolved,
            }
        })
        .collect();
    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{table}");

    if partial > 0 {
        println!("Run 'groupsync diff <pair>' to inspect what is still out of step.");
    }
}

fn state_key(state: State) -> &'static str {
    match state {
        State::NeverSynced => "never_synced",
        State::Clean => "clean",
        State::Partial => "partial",
    }
}

fn state_label(state: State) -> String {
    match state {
        State::NeverSynced => "NEVER SYNCED".bright_black().to_string(),
        State::Clean => "CLEAN".green().to_string(),
        State::Partial => "PARTIAL".yellow().to_string(),
    }
}

fn format_age(timestamp: DateTime<Utc>) -> String {
    let seconds = Utc::now()
        .signed_duration_since(timestamp)
        .num_seconds()
        .max(0);
    let age = match seconds {
        s if s < 60 => format!("{s}s"),
        s if s < 60 * 60 => format!("{}m", s / 60),
        s if s < 60 * 60 * 24 => format!("{}h", s / (60 * 60)),
        s => format!("{}d", s / (60 * 60 * 24)),
    };
    format!("{age} ago")
}
