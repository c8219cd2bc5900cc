//! The narrow interface the engine uses to talk to a directory backend.
//!
//! Backends are symmetric: the same trait serves the on-prem and the cloud
//! directory, and which one plays "source" is decided per reconciliation pass.

use crate::error::GatewayError;
use crate::types::{GroupRef, Identity, IdentityKey, MappingKey, MembershipSnapshot};

/// Result of looking up a correlation key in a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one record matches.
    Found(Identity),
    /// No record carries the key.
    NotFound,
    /// More than one record carries the key.
    Ambiguous(Vec<IdentityKey>),
}

/// Outcome of a successful add call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyMember,
}

/// Outcome of a successful remove call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotMember,
}

/// Translates a correlation key into this directory's full identity record.
pub trait IdentityResolver {
    fn resolve_identity(&self, key: &MappingKey) -> Result<Resolution, GatewayError>;
}

/// A directory backend holding identities and group memberships.
pub trait DirectoryGateway: IdentityResolver {
    /// Read the current members of `group`.
    fn list_members(&self, group: &GroupRef) -> Result<MembershipSnapshot, GatewayError>;

    /// Add `member` to `group`. Adding an existing member is not an error.
    fn add_member(
        &mut self,
        group: &GroupRef,
        member: &IdentityKey,
    ) -> Result<AddOutcome, GatewayError>;

    /// Remove `member` from `group`. Removing an absent member is not an error.
    fn remove_member(
        &mut self,
        group: &GroupRef,
        member: &IdentityKey,
    ) -> Result<RemoveOutcome, GatewayError>;
}

impl<T: IdentityResolver + ?Sized> IdentityResolver for &T {
    fn resolve_identity(&self, key: &MappingKey) -> Result<Resolution, GatewayError> {
        (**self).resolve_identity(key)
    }
}

impl<T: IdentityResolver + ?Sized> IdentityResolver for &mut T {
    fn resolve_identity(&self, key: &MappingKey) -> Result<Resolution, GatewayError> {
        (**self).resolve_identity(key)
    }
}
