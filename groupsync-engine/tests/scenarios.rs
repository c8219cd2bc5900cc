//! Worked examples of a full reconcile against in-memory directories.

use std::collections::BTreeMap;

use groupsync_core::{
    DirectoryGateway, GroupRef, Identity, IdentityKey, MembershipSnapshot, Side, SyncDirection,
};
use groupsync_directory::{DirectoryDocument, LocalDirectory, RemoteDirectory};
use groupsync_engine::{reconcile, ResolutionError};

fn keys(identities: &[Identity]) -> Vec<&str> {
    identities.iter().map(|i| i.key.0.as_str()).collect()
}

fn local_directory(identities: Vec<Identity>, members: &[&str]) -> LocalDirectory {
    let mut groups = BTreeMap::new();
    groups.insert(
        GroupRef::from("cn=eng"),
        members.iter().map(|k| IdentityKey::from(*k)).collect(),
    );
    LocalDirectory::in_memory(DirectoryDocument { identities, groups }).expect("local")
}

fn remote_directory(identities: &[&str], members: &[&str]) -> RemoteDirectory {
    let mut groups = BTreeMap::new();
    groups.insert(
        GroupRef::from("g-eng"),
        members.iter().map(|k| IdentityKey::from(*k)).collect(),
    );
    RemoteDirectory::in_memory(DirectoryDocument {
        identities: identities.iter().map(|k| Identity::remote(*k)).collect(),
        groups,
    })
    .expect("remote")
}

fn snapshots(
    local: &LocalDirectory,
    remote: &RemoteDirectory,
) -> (MembershipSnapshot, MembershipSnapshot) {
    (
        local.list_members(&GroupRef::from("cn=eng")).expect("local"),
        remote.list_members(&GroupRef::from("g-eng")).expect("remote"),
    )
}

// ---------------------------------------------------------------------------
// alice(U1) + bob(U2) on-prem, U1 in the cloud
// ---------------------------------------------------------------------------

fn alice_and_bob() -> (LocalDirectory, RemoteDirectory) {
    (
        local_directory(
            vec![
                Identity::local("cn=alice", Some("U1")).with_display_name("Alice"),
                Identity::local("cn=bob", Some("U2")).with_display_name("Bob"),
            ],
            &["cn=alice", "cn=bob"],
        ),
        remote_directory(&["U1", "U2"], &["U1"]),
    )
}

#[test]
fn push_adds_bob_to_the_cloud_group() {
    let (local, remote) = alice_and_bob();
    let (l, r) = snapshots(&local, &remote);

    let delta = reconcile(&l, &r, SyncDirection::ToRemote, &remote).expect("reconcile");

    assert_eq!(delta.target(), Side::Remote);
    assert_eq!(keys(delta.to_add()), vec!["U2"]);
    assert!(delta.to_remove().is_empty());
    assert!(delta.unresolved().is_empty());
}

#[test]
fn pull_drops_bob_on_prem_because_the_cloud_lacks_him() {
    let (local, remote) = alice_and_bob();
    let (l, r) = snapshots(&local, &remote);

    let delta = reconcile(&l, &r, SyncDirection::ToLocal, &local).expect("reconcile");

    assert_eq!(delta.target(), Side::Local);
    assert!(delta.to_add().is_empty());
    assert_eq!(keys(delta.to_remove()), vec!["cn=bob"]);
}

#[test]
fn push_surfaces_mapping_with_no_cloud_account() {
    let (local, _) = alice_and_bob();
    // U2 has no cloud record at all.
    let remote = remote_directory(&["U1"], &["U1"]);
    let (l, r) = snapshots(&local, &remote);

    let delta = reconcile(&l, &r, SyncDirection::ToRemote, &remote).expect("reconcile");

    assert!(delta.to_add().is_empty());
    assert_eq!(delta.unresolved().len(), 1);
    let unresolved = &delta.unresolved()[0];
    assert_eq!(unresolved.mapping.0, "U2");
    assert_eq!(unresolved.source_key.0, "cn=bob");
    assert_eq!(unresolved.cause, ResolutionError::NotFound);
}

// ---------------------------------------------------------------------------
// carol (unmapped) on-prem, U9 in the cloud
// ---------------------------------------------------------------------------

fn carol_and_u9() -> (LocalDirectory, RemoteDirectory) {
    (
        local_directory(vec![Identity::local("cn=carol", None)], &["cn=carol"]),
        remote_directory(&["U9"], &["U9"]),
    )
}

#[test]
fn push_removes_u9_and_ignores_carol() {
    let (local, remote) = carol_and_u9();
    let (l, r) = snapshots(&local, &remote);

    let delta = reconcile(&l, &r, SyncDirection::ToRemote, &remote).expect("reconcile");

    assert!(delta.to_add().is_empty());
    assert_eq!(keys(delta.to_remove()), vec!["U9"]);
    assert!(delta.unresolved().is_empty());
}

#[test]
fn pull_leaves_carol_alone_and_reports_u9_unresolved() {
    let (local, remote) = carol_and_u9();
    let (l, r) = snapshots(&local, &remote);

    let delta = reconcile(&l, &r, SyncDirection::ToLocal, &local).expect("reconcile");

    assert!(delta.to_add().is_empty());
    assert!(delta.to_remove().is_empty());
    // Nobody on-prem carries U9, so it cannot be added there.
    assert_eq!(delta.unresolved().len(), 1);
    assert_eq!(delta.unresolved()[0].source_key.0, "U9");
}
