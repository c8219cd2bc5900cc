//! The on-premises directory: records keyed by distinguished name, correlated
//! to the cloud through their `mapping_value` attribute.

use std::path::PathBuf;

use groupsync_core::{
    AddOutcome, DirectoryGateway, GatewayError, GroupRef, IdentityKey, IdentityResolver,
    MappingKey, MembershipSnapshot, RemoveOutcome, Resolution, Side,
};

use crate::store::{DirectoryDocument, DirectoryStore};

/// File-backed on-prem directory.
#[derive(Debug, Clone)]
pub struct LocalDirectory {
    store: DirectoryStore,
}

impl LocalDirectory {
    /// Open the store at `path`; changes are written back by [`persist`](Self::persist).
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, GatewayError> {
        let path = path.into();
        let doc = DirectoryDocument::load(&path)?;
        Ok(Self {
            store: DirectoryStore::new(Side::Local, Some(path), doc)?,
        })
    }

    /// Purely in-memory directory, never persisted.
    pub fn in_memory(doc: DirectoryDocument) -> Result<Self, GatewayError> {
        Ok(Self {
            store: DirectoryStore::new(Side::Local, None, doc)?,
        })
    }

    pub fn document(&self) -> &DirectoryDocument {
        self.store.document()
    }

    pub fn is_dirty(&self) -> bool {
        self.store.is_dirty()
    }

    pub fn persist(&mut self) -> Result<bool, GatewayError> {
        self.store.persist()
    }
}

impl IdentityResolver for LocalDirectory {
    /// Finds the on-prem record whose mapping value equals `key`.
    fn resolve_identity(&self, key: &MappingKey) -> Result<Resolution, GatewayError> {
        Ok(self.store.resolve(key))
    }
}

impl DirectoryGateway for LocalDirectory {
    fn list_members(&self, group: &GroupRef) -> Result<MembershipSnapshot, GatewayError> {
        self.store.list_members(group)
    }

    fn add_member(
        &mut self,
        group: &GroupRef,
        member: &IdentityKey,
    ) -> Result<AddOutcome, GatewayError> {
        self.store.add_member(group, member)
    }

    fn remove_member(
        &mut self,
        group: &GroupRef,
        member: &IdentityKey,
    ) -> Result<RemoveOutcome, GatewayError> {
        self.store.remove_member(group, member)
    }
}
