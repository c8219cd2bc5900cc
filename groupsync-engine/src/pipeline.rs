//! Shared reconcile-and-apply entrypoint used by the CLI.
//!
//! One cycle: list both groups → reconcile against the target directory →
//! apply (unless dry-run). Listing failures and contract violations abort the
//! cycle before anything is written.

use std::path::Path;

use groupsync_core::{pairs, DirectoryGateway, GroupPair, PairName, Side, SyncDirection};
use groupsync_directory::{LocalDirectory, RemoteDirectory};

use crate::error::{directory_err, SyncError};
use crate::reconcile::{reconcile, Delta};
use crate::report_store;
use crate::syncer::{apply, SyncReport};

/// Whether a cycle writes to the target directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Reconcile only; return the delta.
    DryRun,
    /// Reconcile and apply.
    Apply,
}

/// Result of one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Planned(Delta),
    Applied(SyncReport),
}

/// Scope for a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncScope {
    /// Every configured pair.
    All,
    /// A single named pair.
    Pair(PairName),
}

/// A completed cycle for one configured pair.
#[derive(Debug)]
pub struct PairRun {
    pub pair: PairName,
    pub direction: SyncDirection,
    pub outcome: CycleOutcome,
}

/// A pair whose cycle was aborted.
#[derive(Debug)]
pub struct PairFailure {
    pub pair: PairName,
    pub error: SyncError,
}

/// Run one reconcile-and-apply cycle between two gateways.
///
/// `direction` picks which gateway is mutated; the other is only read.
pub fn run_cycle<L, R>(
    pair: &GroupPair,
    direction: SyncDirection,
    local: &mut L,
    remote: &mut R,
    mode: Mode,
) -> Result<CycleOutcome, SyncError>
where
    L: DirectoryGateway + ?Sized,
    R: DirectoryGateway + ?Sized,
{
    let local_snapshot = local
        .list_members(&pair.local_group)
        .map_err(|source| SyncError::Snapshot {
            side: Side::Local,
            group: pair.local_group.clone(),
            source,
        })?;
    let remote_snapshot = remote
        .list_members(&pair.remote_group)
        .map_err(|source| SyncError::Snapshot {
            side: Side::Remote,
            group: pair.remote_group.clone(),
            source,
        })?;

    let target = direction.target();
    let source = match target {
        Side::Local => &remote_snapshot,
        Side::Remote => &local_snapshot,
    };
    if source.is_empty() {
        tracing::warn!(
            pair = %pair.name,
            %direction,
            group = %source.group,
            "source group is empty; every mapped target member will be removed"
        );
    }

    let delta = match target {
        Side::Local => reconcile(&local_snapshot, &remote_snapshot, direction, &*local)?,
        Side::Remote => reconcile(&local_snapshot, &remote_snapshot, direction, &*remote)?,
    };

    if mode == Mode::DryRun {
        tracing::info!(
            pair = %pair.name,
            %direction,
            add = delta.to_add().len(),
            remove = delta.to_remove().len(),
            unresolved = delta.unresolved().len(),
            "[dry-run] reconciled"
        );
        return Ok(CycleOutcome::Planned(delta));
    }

    let group = pair.group(target);
    let report = match target {
        Side::Local => apply(delta, local, group),
        Side::Remote => apply(delta, remote, group),
    };
    Ok(CycleOutcome::Applied(report))
}

/// Run one cycle for a configured pair against its file-backed directories.
///
/// In [`Mode::Apply`] the target store is written back and the report saved.
pub fn run_pair(
    home: &Path,
    name: &PairName,
    direction: Option<SyncDirection>,
    mode: Mode,
) -> Result<PairRun, SyncError> {
    let pair = pairs::load_pair_at(home, name)?;
    run_loaded(home, pair, direction, mode)
}

fn run_loaded(
    home: &Path,
    pair: GroupPair,
    direction: Option<SyncDirection>,
    mode: Mode,
) -> Result<PairRun, SyncError> {
    let direction = direction.unwrap_or(pair.direction);

    let mut local = LocalDirectory::open(&pair.local_store).map_err(directory_err(Side::Local))?;
    let mut remote =
        RemoteDirectory::open(&pair.remote_store).map_err(directory_err(Side::Remote))?;

    let outcome = run_cycle(&pair, direction, &mut local, &mut remote, mode)?;

    if let CycleOutcome::Applied(report) = &outcome {
        local.persist().map_err(directory_err(Side::Local))?;
        remote.persist().map_err(directory_err(Side::Remote))?;
        report_store::save_at(home, &pair.name, report)?;
    }

    Ok(PairRun {
        pair: pair.name,
        direction,
        outcome,
    })
}

/// Run the pipeline for a scope.
///
/// With [`SyncScope::All`] a failing pair does not stop the others; each
/// pair's result is returned in config order. A pair config that cannot be
/// listed fails the whole run.
pub fn run(
    home: &Path,
    scope: SyncScope,
    direction: Option<SyncDirection>,
    mode: Mode,
) -> Result<Vec<Result<PairRun, PairFailure>>, SyncError> {
    let loaded: Vec<Result<GroupPair, PairFailure>> = match scope {
        SyncScope::All => pairs::list_pairs_at(home)?.into_iter().map(Ok).collect(),
        SyncScope::Pair(name) => vec![pairs::load_pair_at(home, &name).map_err(|e| {
            PairFailure {
                pair: name,
                error: e.into(),
            }
        })],
    };

    let results = loaded
        .into_iter()
        .map(|loaded| {
            let pair = loaded?;
            let name = pair.name.clone();
            run_loaded(home, pair, direction, mode)
                .map_err(|error| PairFailure { pair: name, error })
        })
        .map(|result| {
            if let Err(failure) = &result {
                tracing::error!(pair = %failure.pair, error = %failure.error, "sync cycle aborted");
            }
            result
        })
        .collect();
    Ok(results)
}
