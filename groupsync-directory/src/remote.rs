//! The cloud directory: records keyed by object id, which is also the value
//! on-prem records carry as their mapping value.

use std::path::PathBuf;

use groupsync_core::{
    AddOutcome, DirectoryGateway, GatewayError, GroupRef, IdentityKey, IdentityResolver,
    MappingKey, MembershipSnapshot, RemoveOutcome, Resolution, Side,
};

use crate::store::{DirectoryDocument, DirectoryStore};

/// File-backed cloud directory.
#[derive(Debug, Clone)]
pub struct RemoteDirectory {
    store: DirectoryStore,
}

impl RemoteDirectory {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, GatewayError> {
        let path = path.into();
        let doc = DirectoryDocument::load(&path)?;
        Ok(Self {
            store: DirectoryStore::new(Side::Remote, Some(path), normalize(doc))?,
        })
    }

    pub fn in_memory(doc: DirectoryDocument) -> Result<Self, GatewayError> {
        Ok(Self {
            store: DirectoryStore::new(Side::Remote, None, normalize(doc))?,
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

/// Cloud records are their own remote key.
fn normalize(mut doc: DirectoryDocument) -> DirectoryDocument {
    for identity in &mut doc.identities {
        identity.remote_key = Some(identity.key.0.clone());
    }
    doc
}

impl IdentityResolver for RemoteDirectory {
    /// Finds the cloud record whose object id equals `key`.
    fn resolve_identity(&self, key: &MappingKey) -> Result<Resolution, GatewayError> {
        Ok(self.store.resolve(key))
    }
}

impl DirectoryGateway for RemoteDirectory {
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
