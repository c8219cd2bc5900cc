//! Last sync report per pair, kept for `groupsync status`.
//!
//! Persists a [`SyncReport`] JSON document at
//! `<home>/.groupsync/reports/<pair>.json`.
//! Writes use the same atomic `.tmp` + rename pattern as the pair config.

use std::path::{Path, PathBuf};

use groupsync_core::PairName;

use crate::error::{io_err, SyncError};
use crate::syncer::SyncReport;

/// `~/.groupsync/reports/<pair>.json`
pub fn store_path_at(home: &Path, pair: &PairName) -> PathBuf {
    home.join(".groupsync")
        .join("reports")
        .join(format!("{}.json", pair.0))
}

/// Load the last report for `pair`, or `None` if it was never applied.
pub fn load_at(home: &Path, pair: &PairName) -> Result<Option<SyncReport>, SyncError> {
    let path = store_path_at(home, pair);
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    Ok(Some(serde_json::from_str(&contents)?))
}

/// Save the report for `pair` atomically.
pub fn save_at(home: &Path, pair: &PairName, report: &SyncReport) -> Result<(), SyncError> {
    let path = store_path_at(home, pair);
    let Some(dir) = path.parent() else {
        return Err(io_err(
            path,
            std::io::Error::other("invalid report store path"),
        ));
    };
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    let json = serde_json::to_string_pretty(report)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}
