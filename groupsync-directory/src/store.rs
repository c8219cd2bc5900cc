//! JSON-backed directory state shared by both directory flavours.
//!
//! A store file looks like:
//!
//! ```json
//! {
//!   "identities": [{ "key": "cn=alice,ou=people", "mapping_value": "U1" }],
//!   "groups": { "cn=eng,ou=groups": ["cn=alice,ou=people"] }
//! }
//! ```
//!
//! Writes use the same atomic `.tmp` + rename pattern as the pair config.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use groupsync_core::error::gateway_io_err;
use groupsync_core::{
    AddOutcome, GatewayError, GroupRef, Identity, IdentityKey, MappingKey, MembershipSnapshot,
    RemoveOutcome, Resolution, Side,
};

/// On-disk payload of a directory store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryDocument {
    #[serde(default)]
    pub identities: Vec<Identity>,
    /// Group → member keys, in insertion order.
    #[serde(default)]
    pub groups: BTreeMap<GroupRef, Vec<IdentityKey>>,
}

impl DirectoryDocument {
    /// Read a document from `path`.
    ///
    /// A missing file is `StoreNotFound`; bad JSON is `Corrupt`.
    pub fn load(path: &Path) -> Result<Self, GatewayError> {
        if !path.exists() {
            return Err(GatewayError::StoreNotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path).map_err(|e| gateway_io_err(path, e))?;
        serde_json::from_str(&contents).map_err(|e| GatewayError::Corrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Save atomically: `<path>.tmp` then rename.
    pub fn save(&self, path: &Path) -> Result<(), GatewayError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| gateway_io_err(dir, e))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| GatewayError::Corrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json).map_err(|e| gateway_io_err(&tmp, e))?;
        std::fs::rename(&tmp, path).map_err(|e| gateway_io_err(path, e))?;
        Ok(())
    }
}

/// In-memory view of one directory, optionally bound to a file.
#[derive(Debug, Clone)]
pub(crate) struct DirectoryStore {
    origin: Side,
    path: Option<PathBuf>,
    doc: DirectoryDocument,
    index: HashMap<IdentityKey, usize>,
    dirty: bool,
}

impl DirectoryStore {
    pub(crate) fn new(
        origin: Side,
        path: Option<PathBuf>,
        doc: DirectoryDocument,
    ) -> Result<Self, GatewayError> {
        let mut index = HashMap::with_capacity(doc.identities.len());
        for (pos, identity) in doc.identities.iter().enumerate() {
            if index.insert(identity.key.clone(), pos).is_some() {
                return Err(GatewayError::Corrupt {
                    path: path.clone().unwrap_or_default(),
                    message: format!("identity '{}' is defined twice", identity.key),
                });
            }
        }
        Ok(Self {
            origin,
            path,
            doc,
            index,
            dirty: false,
        })
    }

    pub(crate) fn document(&self) -> &DirectoryDocument {
        &self.doc
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write back to the bound file if anything changed. Returns whether a write happened.
    pub(crate) fn persist(&mut self) -> Result<bool, GatewayError> {
        let Some(path) = self.path.as_ref() else {
            return Ok(false);
        };
        if !self.dirty {
            return Ok(false);
        }
        self.doc.save(path)?;
        self.dirty = false;
        tracing::debug!(path = %path.display(), "persisted directory store");
        Ok(true)
    }

    pub(crate) fn list_members(&self, group: &GroupRef) -> Result<MembershipSnapshot, GatewayError> {
        let keys = self
            .doc
            .groups
            .get(group)
            .ok_or_else(|| GatewayError::UnknownGroup(group.clone()))?;
        let members = keys
            .iter()
            .map(|key| {
                self.index
                    .get(key)
                    .map(|&pos| self.doc.identities[pos].clone())
                    .ok_or_else(|| GatewayError::UnknownIdentity(key.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MembershipSnapshot::new(self.origin, group.clone(), members))
    }

    pub(crate) fn resolve(&self, key: &MappingKey) -> Resolution {
        let mut matches = self
            .doc
            .identities
            .iter()
            .filter(|identity| identity.correlation_key(self.origin).as_ref() == Some(key));
        match (matches.next(), matches.next()) {
            (None, _) => Resolution::NotFound,
            (Some(found), None) => Resolution::Found(found.clone()),
            (Some(first), Some(second)) => {
                let mut candidates = vec![first.key.clone(), second.key.clone()];
                candidates.extend(matches.map(|m| m.key.clone()));
                Resolution::Ambiguous(candidates)
            }
        }
    }

    pub(crate) fn add_member(
        &mut self,
        group: &GroupRef,
        member: &IdentityKey,
    ) -> Result<AddOutcome, GatewayError> {
        if !self.index.contains_key(member) {
            return Err(GatewayError::UnknownIdentity(member.clone()));
        }
        let keys = self
            .doc
            .groups
            .get_mut(group)
            .ok_or_else(|| GatewayError::UnknownGroup(group.clone()))?;
        if keys.contains(member) {
            return Ok(AddOutcome::AlreadyMember);
        }
        keys.push(member.clone());
        self.dirty = true;
        tracing::debug!(side = %self.origin, %group, %member, "added member");
        Ok(AddOutcome::Added)
    }

    pub(crate) fn remove_member(
        &mut self,
        group: &GroupRef,
        member: &IdentityKey,
    ) -> Result<RemoveOutcome, GatewayError> {
        let keys = self
            .doc
            .groups
            .get_mut(group)
            .ok_or_else(|| GatewayError::UnknownGroup(group.clone()))?;
        let before = keys.len();
        keys.retain(|k| k != member);
        if keys.len() == before {
            return Ok(RemoveOutcome::NotMember);
        }
        self.dirty = true;
        tracing::debug!(side = %self.origin, %group, %member, "removed member");
        Ok(RemoveOutcome::Removed)
    }
}
