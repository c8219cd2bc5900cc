//! Group pair configuration, one YAML file per pair.
//!
//! # Storage layout
//!
//! ```text
//! ~/.groupsync/
//!   pairs/
//!     <pair_name>.yaml   (mode 0600; directory 0700)
//! ```
//!
//! # API pattern
//!
//! Every function that touches disk takes an explicit home:
//! - `fn_at(home: &Path, …)`: used by the engine and in tests with `TempDir`
//! - `list_pairs`, `add_pair`, `remove_pair`: derive home from
//!   `dirs::home_dir()` and delegate to `_at`; these back `groupsync pair`
//!
//! Tests must NEVER call the no-arg wrappers; always use `_at`.
//!
//! The `name` stored inside a pair file must equal its file stem; loading
//! rejects anything else with `ConfigError::NameMismatch`.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{GroupRef, Side, SyncDirection};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Name of a configured group pair; doubles as its file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairName(pub String);

impl PairName {
    /// Reject names that cannot be used as a file stem.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.contains(['/', '\\'])
            || trimmed.starts_with('.')
        {
            return Err(ConfigError::InvalidName(raw.to_owned()));
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl fmt::Display for PairName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for PairName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// One synchronised group: where it lives in each directory and which side wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPair {
    pub name: PairName,
    pub local_group: GroupRef,
    pub remote_group: GroupRef,
    #[serde(default)]
    pub direction: SyncDirection,
    /// State file backing the local directory.
    pub local_store: PathBuf,
    /// State file backing the remote directory.
    pub remote_store: PathBuf,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GroupPair {
    pub fn group(&self, side: Side) -> &GroupRef {
        match side {
            Side::Local => &self.local_group,
            Side::Remote => &self.remote_group,
        }
    }
}

/// Fields a caller supplies when registering a new pair.
#[derive(Debug, Clone)]
pub struct NewPair {
    pub local_group: GroupRef,
    pub remote_group: GroupRef,
    pub direction: SyncDirection,
    pub local_store: PathBuf,
    pub remote_store: PathBuf,
}

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.groupsync/pairs/`: pure, no I/O.
pub fn pairs_dir_at(home: &Path) -> PathBuf {
    home.join(".groupsync").join("pairs")
}

/// `<home>/.groupsync/pairs/<name>.yaml`: pure, no I/O.
pub fn pair_path_at(home: &Path, name: &PairName) -> PathBuf {
    pairs_dir_at(home).join(format!("{}.yaml", name.0))
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load a single pair from `<home>/.groupsync/pairs/<name>.yaml`.
///
/// Returns `ConfigError::PairNotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML,
/// `ConfigError::NameMismatch` if the `name` field disagrees with the file name.
pub fn load_pair_at(home: &Path, name: &PairName) -> Result<GroupPair, ConfigError> {
    let name = PairName::parse(&name.0)?;
    let path = pair_path_at(home, &name);
    if !path.exists() {
        return Err(ConfigError::PairNotFound { path });
    }
    read_pair(&path, &name.0)
}

/// Every configured pair, sorted by name. Non-YAML files are ignored.
pub fn list_pairs_at(home: &Path) -> Result<Vec<GroupPair>, ConfigError> {
    let dir = pairs_dir_at(home);
    if !dir.exists() {
        return Ok(vec![]);
    }

    let mut entries: Vec<_> = std::fs::read_dir(&dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .collect();
    entries.sort_by_key(|e| e.file_name());

    let mut pairs = Vec::new();
    for entry in entries {
        let fname = entry.file_name();
        let fname = fname.to_string_lossy();
        let Some(stem) = fname.strip_suffix(".yaml") else {
            continue;
        };
        pairs.push(read_pair(&entry.path(), stem)?);
    }
    pairs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(pairs)
}

/// `list_pairs_at` convenience wrapper.
pub fn list_pairs() -> Result<Vec<GroupPair>, ConfigError> {
    list_pairs_at(&home()?)
}

// ---------------------------------------------------------------------------
// 3. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save a pair to `<home>/.groupsync/pairs/<name>.yaml`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_pair_at(home: &Path, pair: &GroupPair) -> Result<(), ConfigError> {
    let dir = pairs_dir_at(home);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
        set_dir_permissions(&dir)?;
    }
    let path = pair_path_at(home, &pair.name);
    let tmp_path = path.with_file_name(format!("{}.yaml.tmp", pair.name.0));

    let yaml = serde_yaml::to_string(pair)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// 4. Add / remove
// ---------------------------------------------------------------------------

/// Register a new pair.
///
/// Idempotent: if a pair with this name already exists it is loaded and
/// returned unchanged.
pub fn add_pair_at(home: &Path, name: PairName, new: NewPair) -> Result<GroupPair, ConfigError> {
    let name = PairName::parse(&name.0)?;
    if pair_path_at(home, &name).exists() {
        return load_pair_at(home, &name);
    }

    let now = Utc::now();
    let pair = GroupPair {
        name,
        local_group: new.local_group,
        remote_group: new.remote_group,
        direction: new.direction,
        local_store: new.local_store,
        remote_store: new.remote_store,
        created_at: now,
        updated_at: now,
    };
    save_pair_at(home, &pair)?;
    Ok(pair)
}

/// `add_pair_at` convenience wrapper.
pub fn add_pair(name: PairName, new: NewPair) -> Result<GroupPair, ConfigError> {
    add_pair_at(&home()?, name, new)
}

/// Delete a pair's config file. Returns `PairNotFound` if it does not exist.
pub fn remove_pair_at(home: &Path, name: &PairName) -> Result<(), ConfigError> {
    let path = pair_path_at(home, name);
    if !path.exists() {
        return Err(ConfigError::PairNotFound { path });
    }
    std::fs::remove_file(&path)?;
    Ok(())
}

/// `remove_pair_at` convenience wrapper.
pub fn remove_pair(name: &PairName) -> Result<(), ConfigError> {
    remove_pair_at(&home()?, name)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

/// Parse a pair file whose stem is `stem`. The stored `name` must be a valid
/// pair name equal to the stem, since paths are derived from it.
fn read_pair(path: &Path, stem: &str) -> Result<GroupPair, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let pair: GroupPair = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    let valid = PairName::parse(&pair.name.0).is_ok_and(|n| n == pair.name);
    if !valid || pair.name.0 != stem {
        return Err(ConfigError::NameMismatch {
            path: path.to_path_buf(),
            expected: stem.to_owned(),
            found: pair.name.0,
        });
    }
    Ok(pair)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
