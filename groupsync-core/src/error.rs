//! Error types for groupsync-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{GroupRef, IdentityKey};

/// All errors that can arise from group pair configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load: includes file path and line context from serde_yaml.
    #[error("failed to parse pair config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`: cannot locate `~/.groupsync/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// No pair config exists at the expected path.
    #[error("group pair not found at {path}")]
    PairNotFound { path: PathBuf },

    /// The `name` stored in a pair file does not match the file it lives in.
    #[error("pair config at {path} is named '{found}', expected '{expected}'")]
    NameMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    /// Pair names become file names, so separators and blanks are rejected.
    #[error("invalid group pair name '{0}'")]
    InvalidName(String),
}

/// Failure reported by a directory backend.
///
/// Returned from every [`DirectoryGateway`](crate::gateway::DirectoryGateway)
/// call; an `Err` from `add_member`/`remove_member` is the "failed" outcome.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("unknown group '{0}'")]
    UnknownGroup(GroupRef),

    #[error("unknown identity '{0}'")]
    UnknownIdentity(IdentityKey),

    #[error("directory store not found at {path}")]
    StoreNotFound { path: PathBuf },

    #[error("directory store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed directory store at {path}: {message}")]
    Corrupt { path: PathBuf, message: String },

    /// Anything the backend itself rejected (permissions, throttling, stale reference).
    #[error("backend error: {0}")]
    Backend(String),
}

/// Convenience constructor for [`GatewayError::Io`].
pub fn gateway_io_err(path: impl Into<PathBuf>, source: std::io::Error) -> GatewayError {
    GatewayError::Io {
        path: path.into(),
        source,
    }
}
