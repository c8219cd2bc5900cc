//! Error types for groupsync-engine.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use groupsync_core::{ConfigError, GatewayError, GroupRef, IdentityKey, MappingKey, Side};

/// Malformed reconciliation input. Fatal: nothing is applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("{side} snapshot entry #{position} has no native identifier")]
    MissingKey { side: Side, position: usize },

    #[error("{side} snapshot lists '{key}' more than once")]
    DuplicateKey { side: Side, key: IdentityKey },

    #[error("remote snapshot entry '{key}' carries no remote key")]
    MissingRemoteKey { key: IdentityKey },

    #[error("{side} snapshot maps '{mapping}' to both '{first}' and '{second}'")]
    DuplicateMapping {
        side: Side,
        mapping: MappingKey,
        first: IdentityKey,
        second: IdentityKey,
    },

    #[error("'{mapping}' matches {} records in the {side} directory", .candidates.len())]
    AmbiguousResolution {
        side: Side,
        mapping: MappingKey,
        candidates: Vec<IdentityKey>,
    },

    #[error("expected a {expected} snapshot, got a {actual} one")]
    WrongSide { expected: Side, actual: Side },
}

/// Why a source entry could not be turned into a target-native identity.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "cause", rename_all = "snake_case")]
pub enum ResolutionError {
    #[error("no matching record in the target directory")]
    NotFound,

    #[error("lookup failed: {0}")]
    Gateway(String),
}

/// All errors that stop a sync cycle.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A directory store could not be opened or written back.
    #[error("{side} directory error: {source}")]
    Directory {
        side: Side,
        #[source]
        source: GatewayError,
    },

    /// Reading a snapshot failed; nothing was reconciled.
    #[error("failed to list {side} group '{group}': {source}")]
    Snapshot {
        side: Side,
        group: GroupRef,
        #[source]
        source: GatewayError,
    },

    #[error("contract violation: {0}")]
    Contract(#[from] ContractError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error (report store).
    #[error("report store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

pub(crate) fn directory_err(side: Side) -> impl FnOnce(GatewayError) -> SyncError {
    move |source| SyncError::Directory { side, source }
}
