//! Pair config error-message, atomic-write-safety, and listing integration tests.
//! Storage: ~/.groupsync/pairs/<name>.yaml

use assert_fs::prelude::*;
use groupsync_core::{
    pairs::{self, NewPair, PairName},
    types::{GroupRef, SyncDirection},
    ConfigError,
};
use predicates::prelude::predicate;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;

fn eng() -> PairName {
    PairName::from("engineering")
}

fn new_pair(direction: SyncDirection) -> NewPair {
    NewPair {
        local_group: GroupRef::from("cn=engineering,ou=groups,dc=corp,dc=example"),
        remote_group: GroupRef::from("6b1f0c7e-engineering"),
        direction,
        local_store: PathBuf::from("/var/lib/groupsync/onprem.json"),
        remote_store: PathBuf::from("/var/lib/groupsync/cloud.json"),
    }
}

// ---------------------------------------------------------------------------
// 1. Load error messages
// ---------------------------------------------------------------------------

#[test]
fn load_missing_pair_returns_not_found() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let err = pairs::load_pair_at(home.path(), &eng()).unwrap_err();
    assert!(matches!(err, ConfigError::PairNotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("group pair not found"));
    assert!(err.to_string().contains("engineering.yaml"));
}

#[test]
fn load_corrupt_yaml_returns_parse_error_with_path() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let dir = home.path().join(".groupsync").join("pairs");
    fs::create_dir_all(&dir).expect("mkdir");
    fs::write(dir.join("engineering.yaml"), b": : corrupt : yaml : !!!\n  - broken: [unclosed")
        .expect("write");

    let err = pairs::load_pair_at(home.path(), &eng()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("engineering.yaml"));
}

#[test]
fn list_surfaces_parse_error_for_bad_file() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    pairs::add_pair_at(home.path(), eng(), new_pair(SyncDirection::ToRemote)).expect("add");
    home.child(".groupsync/pairs/broken.yaml")
        .write_str("- this is a list, not a mapping\n")
        .expect("write");

    let err = pairs::list_pairs_at(home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
}

// ---------------------------------------------------------------------------
// 2. Atomic write safety
// ---------------------------------------------------------------------------

#[test]
fn mid_write_crash_leaves_original_intact() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    pairs::add_pair_at(home.path(), eng(), new_pair(SyncDirection::ToRemote)).expect("add");

    let yaml_path = pairs::pair_path_at(home.path(), &eng());
    let original_bytes = fs::read(&yaml_path).expect("read original");

    // Simulate crash: .tmp written but process died before rename
    let tmp = yaml_path.with_file_name("engineering.yaml.tmp");
    fs::write(&tmp, b"CRASH - INCOMPLETE WRITE").expect("write crash tmp");

    assert_eq!(original_bytes, fs::read(&yaml_path).expect("read after crash"));
    // Leftover .tmp files are not picked up as pairs.
    let list = pairs::list_pairs_at(home.path()).expect("list");
    assert_eq!(list.len(), 1);
}

#[test]
fn saved_pair_has_owner_only_permissions() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    pairs::add_pair_at(home.path(), eng(), new_pair(SyncDirection::ToRemote)).expect("add");

    home.child(".groupsync/pairs/engineering.yaml")
        .assert(predicate::path::exists());

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let path = pairs::pair_path_at(home.path(), &eng());
        let mode = fs::metadata(&path).expect("meta").permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "expected 0600, got {mode:o}");
    }
}

// ---------------------------------------------------------------------------
// 3. Add / list / remove
// ---------------------------------------------------------------------------

#[rstest]
#[case(SyncDirection::ToRemote)]
#[case(SyncDirection::ToLocal)]
fn add_persists_direction(#[case] direction: SyncDirection) {
    let home = assert_fs::TempDir::new().expect("tempdir");
    pairs::add_pair_at(home.path(), eng(), new_pair(direction)).expect("add");
    let loaded = pairs::load_pair_at(home.path(), &eng()).expect("load");
    assert_eq!(loaded.direction, direction);
}

#[test]
fn add_is_idempotent() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    pairs::add_pair_at(home.path(), eng(), new_pair(SyncDirection::ToRemote)).expect("first");
    let second =
        pairs::add_pair_at(home.path(), eng(), new_pair(SyncDirection::ToLocal)).expect("second");

    // First wins.
    assert_eq!(second.direction, SyncDirection::ToRemote);
    assert_eq!(pairs::list_pairs_at(home.path()).expect("list").len(), 1);
}

#[test]
fn list_is_sorted_and_deterministic() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    pairs::add_pair_at(home.path(), PairName::from("sales"), new_pair(SyncDirection::ToRemote))
        .expect("sales");
    pairs::add_pair_at(home.path(), PairName::from("admins"), new_pair(SyncDirection::ToLocal))
        .expect("admins");

    let names: Vec<_> = pairs::list_pairs_at(home.path())
        .expect("list")
        .into_iter()
        .map(|p| p.name.0)
        .collect();
    assert_eq!(names, vec!["admins", "sales"]);
}

#[test]
fn list_empty_when_no_config_dir() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    assert!(pairs::list_pairs_at(home.path()).expect("list").is_empty());
}

#[test]
fn remove_deletes_file() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    pairs::add_pair_at(home.path(), eng(), new_pair(SyncDirection::ToRemote)).expect("add");
    pairs::remove_pair_at(home.path(), &eng()).expect("remove");
    home.child(".groupsync/pairs/engineering.yaml")
        .assert(predicate::path::missing());
}

#[test]
fn add_rejects_path_like_names() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let err = pairs::add_pair_at(
        home.path(),
        PairName::from("../outside"),
        new_pair(SyncDirection::ToRemote),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidName(_)));
}

// ---------------------------------------------------------------------------
// 4. Stored name must match the file
// ---------------------------------------------------------------------------

/// Rewrite the `name:` line of engineering.yaml.
fn tamper_name(home: &assert_fs::TempDir, name: &str) {
    let path = pairs::pair_path_at(home.path(), &eng());
    let yaml = fs::read_to_string(&path).expect("read");
    let edited = yaml.replace("name: engineering", &format!("name: {name}"));
    assert_ne!(yaml, edited, "name line not found");
    fs::write(&path, edited).expect("write");
}

#[rstest]
#[case("../../escape")]
#[case("sales")]
#[case(".hidden")]
fn list_rejects_name_that_differs_from_file(#[case] stored: &str) {
    let home = assert_fs::TempDir::new().expect("tempdir");
    pairs::add_pair_at(home.path(), eng(), new_pair(SyncDirection::ToRemote)).expect("add");
    tamper_name(&home, stored);

    let err = pairs::list_pairs_at(home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::NameMismatch { .. }), "got: {err}");
    assert!(err.to_string().contains("expected 'engineering'"));
}

#[test]
fn load_rejects_name_that_differs_from_file() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    pairs::add_pair_at(home.path(), eng(), new_pair(SyncDirection::ToRemote)).expect("add");
    tamper_name(&home, "../../escape");

    let err = pairs::load_pair_at(home.path(), &eng()).unwrap_err();
    assert!(
        matches!(&err, ConfigError::NameMismatch { found, .. } if found == "../../escape"),
        "got: {err}"
    );
}

#[test]
fn copied_config_under_new_file_name_is_rejected() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    pairs::add_pair_at(home.path(), eng(), new_pair(SyncDirection::ToRemote)).expect("add");
    let original = pairs::pair_path_at(home.path(), &eng());
    fs::copy(&original, original.with_file_name("copy.yaml")).expect("copy");

    let err = pairs::load_pair_at(home.path(), &PairName::from("copy")).unwrap_err();
    assert!(matches!(err, ConfigError::NameMismatch { .. }), "got: {err}");
}

#[test]
fn load_rejects_path_like_lookup_name() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let err = pairs::load_pair_at(home.path(), &PairName::from("../outside")).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidName(_)), "got: {err}");
}
