//! # groupsync-engine
//!
//! Membership reconciliation between an on-prem and a cloud directory.
//!
//! - [`reconcile`] computes a [`Delta`] from two snapshots and a direction
//! - [`syncer::apply`] applies it to the target directory and returns a [`SyncReport`]
//! - [`pipeline::run`] drives both for configured group pairs

pub mod error;
pub mod pipeline;
pub mod reconcile;
pub mod report_store;
pub mod syncer;

pub use error::{ContractError, ResolutionError, SyncError};
pub use pipeline::{CycleOutcome, Mode, PairFailure, PairRun, SyncScope};
pub use reconcile::{plan, reconcile, resolve, Delta, Plan, PlannedAdd, Unresolved};
pub use syncer::{apply, MemberAction, MemberOutcome, MemberStatus, SyncReport};
