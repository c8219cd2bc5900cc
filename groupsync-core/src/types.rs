//! Domain types shared by the reconciler, the syncer and the directory backends.
//!
//! Identifiers are newtypes over `String`; a record never mixes a native key
//! with a correlation value without going through [`Identity::correlation_key`].

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Native identifier of an identity inside its own directory
/// (a distinguished name on-prem, an object id in the cloud).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(pub String);

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for IdentityKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for IdentityKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Correlation value used to match one identity across both directories.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingKey(pub String);

impl fmt::Display for MappingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for MappingKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MappingKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Reference to a group inside one directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupRef(pub String);

impl fmt::Display for GroupRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for GroupRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for GroupRef {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which of the two directories a record or snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The on-premises directory.
    Local,
    /// The cloud directory.
    Remote,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Local => Side::Remote,
            Side::Remote => Side::Local,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Local => write!(f, "local"),
            Side::Remote => write!(f, "remote"),
        }
    }
}

/// Selects the source of truth for one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SyncDirection {
    /// The local directory is authoritative; the remote group is mutated.
    #[default]
    ToRemote,
    /// The remote directory is authoritative; the local group is mutated.
    ToLocal,
}

impl SyncDirection {
    /// The authoritative side.
    pub fn source(self) -> Side {
        match self {
            SyncDirection::ToRemote => Side::Local,
            SyncDirection::ToLocal => Side::Remote,
        }
    }

    /// The side whose membership is changed.
    pub fn target(self) -> Side {
        self.source().opposite()
    }
}

impl fmt::Display for SyncDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncDirection::ToRemote => write!(f, "to-remote"),
            SyncDirection::ToLocal => write!(f, "to-local"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A directory-native user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub key: IdentityKey,
    /// Correlation value written by the provisioning process (local-origin records).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping_value: Option<String>,
    /// The remote directory's native id (remote-origin records).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Identity {
    /// A local-origin record, optionally carrying a mapping value.
    pub fn local(key: impl Into<IdentityKey>, mapping_value: Option<&str>) -> Self {
        Self {
            key: key.into(),
            mapping_value: mapping_value.map(str::to_owned),
            remote_key: None,
            display_name: None,
        }
    }

    /// A remote-origin record; its native key doubles as its `remote_key`.
    pub fn remote(key: impl Into<IdentityKey>) -> Self {
        let key = key.into();
        Self {
            remote_key: Some(key.0.clone()),
            key,
            mapping_value: None,
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// The value used to match this record against the other directory.
    ///
    /// Blank values count as absent.
    pub fn correlation_key(&self, origin: Side) -> Option<MappingKey> {
        let raw = match origin {
            Side::Local => self.mapping_value.as_deref(),
            Side::Remote => self.remote_key.as_deref(),
        }?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(MappingKey::from(trimmed))
        }
    }
}

/// Point-in-time read of one group's membership in one directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipSnapshot {
    pub side: Side,
    pub group: GroupRef,
    #[serde(default)]
    pub members: Vec<Identity>,
}

impl MembershipSnapshot {
    pub fn new(side: Side, group: impl Into<GroupRef>, members: Vec<Identity>) -> Self {
        Self {
            side,
            group: group.into(),
            members,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members paired with their correlation key, unmapped records skipped.
    pub fn mapped(&self) -> impl Iterator<Item = (MappingKey, &Identity)> + '_ {
        self.members
            .iter()
            .filter_map(move |m| m.correlation_key(self.side).map(|k| (k, m)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(IdentityKey::from("cn=alice").to_string(), "cn=alice");
        assert_eq!(MappingKey::from("U1").to_string(), "U1");
        assert_eq!(GroupRef::from("engineering").to_string(), "engineering");
    }

    #[test]
    fn direction_roles_are_mirrored() {
        assert_eq!(SyncDirection::ToRemote.source(), Side::Local);
        assert_eq!(SyncDirection::ToRemote.target(), Side::Remote);
        assert_eq!(SyncDirection::ToLocal.source(), Side::Remote);
        assert_eq!(SyncDirection::ToLocal.target(), Side::Local);
    }

    #[test]
    fn blank_mapping_value_is_unmapped() {
        let carol = Identity::local("cn=carol", Some("   "));
        assert_eq!(carol.correlation_key(Side::Local), None);
        let dave = Identity::local("cn=dave", None);
        assert_eq!(dave.correlation_key(Side::Local), None);
    }

    #[test]
    fn correlation_key_depends_on_origin() {
        let alice = Identity::local("cn=alice", Some(" U1 "));
        assert_eq!(alice.correlation_key(Side::Local), Some(MappingKey::from("U1")));
        assert_eq!(alice.correlation_key(Side::Remote), None);

        let u1 = Identity::remote("U1");
        assert_eq!(u1.correlation_key(Side::Remote), Some(MappingKey::from("U1")));
    }

    #[test]
    fn direction_serde_uses_kebab_case() {
        let yaml = serde_yaml::to_string(&SyncDirection::ToLocal).expect("serialize");
        assert_eq!(yaml.trim(), "to-local");
        let parsed: SyncDirection = serde_yaml::from_str("to-remote").expect("deserialize");
        assert_eq!(parsed, SyncDirection::ToRemote);
    }

    #[test]
    fn snapshot_mapped_skips_unmapped_members() {
        let snap = MembershipSnapshot::new(
            Side::Local,
            "eng",
            vec![
                Identity::local("cn=alice", Some("U1")),
                Identity::local("cn=carol", None),
            ],
        );
        let keys: Vec<_> = snap.mapped().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![MappingKey::from("U1")]);
    }
}
