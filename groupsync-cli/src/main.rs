//! groupsync: keep group membership in step between an on-prem and a cloud directory.
//!
//! # Usage
//!
//! ```text
//! groupsync pair add <name> --local-group <dn> --remote-group <id> --local-store <path> --remote-store <path> [--direction to-remote|to-local]
//! groupsync pair list
//! groupsync pair remove <name>
//! groupsync diff <pair> [--direction ...] [--json]
//! groupsync sync <pair> [--direction ...] [--dry-run] [--json]
//! groupsync sync --all [--dry-run] [--json]
//! groupsync status [--json]
//! ```

mod commands;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{diff::DiffArgs, pair::PairCommand, status::StatusArgs, sync::SyncArgs};
use groupsync_core::SyncDirection;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "groupsync",
    version,
    about = "Reconcile group membership between an on-prem and a cloud directory",
    long_about = None,
)]
struct Cli {
    /// Log every member update (same as RUST_LOG=debug).
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage configured group pairs.
    Pair {
        #[command(subcommand)]
        command: PairCommand,
    },

    /// Show what a sync would change, without writing.
    Diff(DiffArgs),

    /// Reconcile and apply membership for one pair or all of them.
    Sync(SyncArgs),

    /// Show the last sync result for every pair.
    Status(StatusArgs),
}

// ---------------------------------------------------------------------------
// Shared direction argument
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `SyncDirection` from CLI args.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectionArg(pub SyncDirection);

impl FromStr for DirectionArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "to-remote" | "remote" | "push" => Ok(Self(SyncDirection::ToRemote)),
            "to-local" | "local" | "pull" => Ok(Self(SyncDirection::ToLocal)),
            other => Err(format!(
                "unknown direction '{other}'; expected: to-remote, to-local"
            )),
        }
    }
}

impl fmt::Display for DirectionArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<DirectionArg> for SyncDirection {
    fn from(d: DirectionArg) -> Self {
        d.0
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Pair { command } => commands::pair::run(command),
        Commands::Diff(args) => args.run(),
        Commands::Sync(args) => args.run(),
        Commands::Status(args) => args.run(),
    }
}

/// Logs go to stderr so `--json` output stays parseable.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
