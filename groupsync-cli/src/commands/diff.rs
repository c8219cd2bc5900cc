//! `groupsync diff <pair>`: show what a sync would change.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use groupsync_core::{Identity, PairName, SyncDirection};
use groupsync_engine::{pipeline, CycleOutcome, Delta, Mode};

use super::home_dir;
use crate::DirectionArg;

/// Arguments for `groupsync diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Pair name to diff.
    pub pair: String,

    /// Override the pair's configured direction.
    #[arg(long, value_name = "DIRECTION")]
    pub direction: Option<DirectionArg>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct DiffJson<'a> {
    pair: &'a PairName,
    #[serde(flatten)]
    delta: &'a Delta,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let home = home_dir()?;
        let name = PairName::parse(&self.pair)?;

        let run = pipeline::run_pair(
            &home,
            &name,
            self.direction.map(SyncDirection::from),
            Mode::DryRun,
        )
        .with_context(|| format!("diff failed for '{name}'"))?;
        let CycleOutcome::Planned(delta) = &run.outcome else {
            bail!("diff for '{name}' unexpectedly applied changes");
        };

        if self.json {
            let payload = DiffJson {
                pair: &run.pair,
                delta,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize diff JSON")?
            );
            return Ok(());
        }

        print_delta(&run.pair, delta);
        Ok(())
    }
}

pub(crate) fn print_delta(pair: &PairName, delta: &Delta) {
    if delta.is_empty() && delta.unresolved().is_empty() {
        println!("No differences for '{pair}' ({}).", delta.direction());
        return;
    }

    println!(
        "'{pair}' ({}) changes to the {} directory:",
        delta.direction(),
        delta.target()
    );
    for identity in delta.to_add() {
        println!("  {} {}", "+".green().bold(), describe(identity));
    }
    for identity in delta.to_remove() {
        println!("  {} {}", "-".red().bold(), describe(identity));
    }
    for entry in delta.unresolved() {
        println!(
            "  {} {} (from {}): {}",
            "?".yellow().bold(),
            entry.mapping,
            entry.source_key,
            entry.cause
        );
    }
}

fn describe(identity: &Identity) -> String {
    match &identity.display_name {
        Some(name) => format!("{} ({name})", identity.key),
        None => identity.key.to_string(),
    }
}
