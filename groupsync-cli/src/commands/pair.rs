//! `groupsync pair list|add|remove`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tabled::{settings::Style, Table, Tabled};

use groupsync_core::{pairs, GroupRef, NewPair, PairName};

use crate::DirectionArg;

/// Manage configured group pairs.
#[derive(Subcommand, Debug)]
pub enum PairCommand {
    /// List every configured pair.
    List,

    /// Register a new on-prem ↔ cloud group pair.
    Add(AddArgs),

    /// Forget a pair. Directory stores are left untouched.
    Remove {
        /// Pair name.
        name: String,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Pair name (e.g. "engineering"); also the config file stem.
    pub name: String,

    /// On-prem group reference (e.g. "cn=eng,ou=groups").
    #[arg(long)]
    pub local_group: String,

    /// Cloud group reference.
    #[arg(long)]
    pub remote_group: String,

    /// Path to the on-prem directory store.
    #[arg(long, value_name = "PATH")]
    pub local_store: PathBuf,

    /// Path to the cloud directory store.
    #[arg(long, value_name = "PATH")]
    pub remote_store: PathBuf,

    /// Which side is authoritative: to-remote | to-local. Defaults to to-remote.
    #[arg(long, value_name = "DIRECTION")]
    pub direction: Option<DirectionArg>,
}

#[derive(Tabled)]
struct PairRow {
    #[tabled(rename = "pair")]
    name: String,
    #[tabled(rename = "direction")]
    direction: String,
    #[tabled(rename = "on-prem group")]
    local_group: String,
    #[tabled(rename = "cloud group")]
    remote_group: String,
}

pub fn run(cmd: PairCommand) -> Result<()> {
    match cmd {
        PairCommand::List => list(),
        PairCommand::Add(args) => add(args),
        PairCommand::Remove { name } => remove(&name),
    }
}

fn list() -> Result<()> {
    let pairs = pairs::list_pairs().context("failed to load pair configs")?;
    if pairs.is_empty() {
        println!("No pairs configured.");
        println!("Run: groupsync pair add <name> --local-group <dn> --remote-group <id> ...");
        return Ok(());
    }

    let rows: Vec<PairRow> = pairs
        .into_iter()
        .map(|p| PairRow {
            name: p.name.0,
            direction: p.direction.to_string(),
            local_group: p.local_group.0,
            remote_group: p.remote_group.0,
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn add(args: AddArgs) -> Result<()> {
    let name = PairName::parse(&args.name)?;
    let pair = pairs::add_pair(
        name,
        NewPair {
            local_group: GroupRef::from(args.local_group),
            remote_group: GroupRef::from(args.remote_group),
            direction: args.direction.unwrap_or_default().into(),
            local_store: absolute(args.local_store)?,
            remote_store: absolute(args.remote_store)?,
        },
    )
    .with_context(|| format!("failed to add pair '{}'", args.name))?;

    println!(
        "✓ Pair '{}': {} → {} ({})",
        pair.name, pair.local_group, pair.remote_group, pair.direction
    );
    Ok(())
}

fn remove(name: &str) -> Result<()> {
    let name = PairName::parse(name)?;
    pairs::remove_pair(&name).with_context(|| format!("failed to remove pair '{name}'"))?;
    println!("✓ Removed pair '{name}'");
    Ok(())
}

/// Store paths are saved absolute, resolved against the current directory.
fn absolute(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().context("could not determine current directory")?;
    Ok(cwd.join(path))
}
