//! `groupsync sync`: reconcile and apply membership for configured pairs.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use groupsync_core::{PairName, SyncDirection};
use groupsync_engine::{
    pipeline::{self, SyncScope},
    CycleOutcome, Delta, MemberAction, MemberStatus, Mode, PairFailure, PairRun, SyncReport,
};

use super::{diff::print_delta, home_dir};
use crate::DirectionArg;

/// Arguments for `groupsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Name of the pair to sync (omit when using `--all`).
    pub pair: Option<String>,

    /// Sync every configured pair.
    #[arg(long, conflicts_with = "pair")]
    pub all: bool,

    /// Override each pair's configured direction.
    #[arg(long, value_name = "DIRECTION")]
    pub direction: Option<DirectionArg>,

    /// Show what would change without touching either directory.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
enum PairJson<'a> {
    Planned {
        pair: &'a PairName,
        direction: SyncDirection,
        delta: &'a Delta,
    },
    Applied {
        pair: &'a PairName,
        report: &'a SyncReport,
    },
    Failed {
        pair: &'a PairName,
        error: String,
    },
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let home = home_dir()?;
        let mode = if self.dry_run { Mode::DryRun } else { Mode::Apply };
        let direction = self.direction.map(SyncDirection::from);

        let scope = if self.all {
            SyncScope::All
        } else {
            let raw = self
                .pair
                .as_deref()
                .context("provide a pair name or use --all")?;
            SyncScope::Pair(PairName::parse(raw)?)
        };
        let single = matches!(scope, SyncScope::Pair(_));
        tracing::debug!(?scope, ?mode, ?direction, "starting sync");

        let mut results = pipeline::run(&home, scope, direction, mode).context("sync failed")?;

        // JSON callers get the failure entry in the payload instead.
        if single && !self.json && matches!(results.first(), Some(Err(_))) {
            if let Some(Err(failure)) = results.pop() {
                let pair = failure.pair;
                return Err(anyhow::Error::new(failure.error))
                    .with_context(|| format!("sync failed for '{pair}'"));
            }
        }

        if self.json {
            print_json(&results)?;
        } else if results.is_empty() {
            println!("No pairs configured. Run `groupsync pair add` first.");
        } else {
            for result in &results {
                match result {
                    Ok(run) => print_run(run),
                    Err(failure) => print_failure(failure),
                }
            }
        }

        let partial = results.iter().filter(|r| !is_clean(r)).count();
        if partial > 0 {
            bail!(
                "{partial} of {} pair(s) did not sync cleanly",
                results.len()
            );
        }
        Ok(())
    }
}

fn is_clean(result: &Result<PairRun, PairFailure>) -> bool {
    match result {
        Ok(run) => match &run.outcome {
            CycleOutcome::Planned(delta) => delta.unresolved().is_empty(),
            CycleOutcome::Applied(report) => report.is_clean(),
        },
        Err(_) => false,
    }
}

fn print_json(results: &[Result<PairRun, PairFailure>]) -> Result<()> {
    let payload: Vec<PairJson<'_>> = results
        .iter()
        .map(|result| match result {
            Ok(run) => match &run.outcome {
                CycleOutcome::Planned(delta) => PairJson::Planned {
                    pair: &run.pair,
                    direction: run.direction,
                    delta,
                },
                CycleOutcome::Applied(report) => PairJson::Applied {
                    pair: &run.pair,
                    report,
                },
            },
            Err(failure) => PairJson::Failed {
                pair: &failure.pair,
                error: failure.error.to_string(),
            },
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize sync JSON")?
    );
    Ok(())
}

fn print_run(run: &PairRun) {
    match &run.outcome {
        CycleOutcome::Planned(delta) => {
            print!("[dry-run] ");
            print_delta(&run.pair, delta);
        }
        CycleOutcome::Applied(report) => print_report(&run.pair, report),
    }
}

fn print_report(pair: &PairName, report: &SyncReport) {
    let failed = report.failures().count();
    let unresolved = report.unresolved.len();

    if report.outcomes.is_empty() && unresolved == 0 {
        println!("✓ '{pair}': nothing to do ({})", report.direction);
        return;
    }

    let counts = format!(
        "{} applied, {} unchanged, {failed} failed, {unresolved} unresolved",
        report.applied(),
        report.unchanged()
    );
    if report.is_clean() {
        println!("✓ '{pair}' synced {} ({counts})", report.direction);
    } else {
        println!(
            "{} '{pair}' partially synced {} ({counts})",
            "✗".red().bold(),
            report.direction
        );
    }

    for outcome in &report.outcomes {
        let sign = match outcome.action {
            MemberAction::Add => "+",
            MemberAction::Remove => "-",
        };
        match &outcome.status {
            MemberStatus::Applied => println!("  {}  {}", sign.green(), outcome.key),
            MemberStatus::Unchanged => println!("  ·  {}", outcome.key),
            MemberStatus::Failed { cause } => {
                println!("  {}  {}: {cause}", sign.red(), outcome.key)
            }
        }
    }
    for entry in &report.unresolved {
        println!(
            "  {}  {} (from {}): {}",
            "?".yellow(),
            entry.mapping,
            entry.source_key,
            entry.cause
        );
    }
}

fn print_failure(failure: &PairFailure) {
    eprintln!(
        "{} '{}' aborted: {}",
        "✗".red().bold(),
        failure.pair,
        failure.error
    );
}
