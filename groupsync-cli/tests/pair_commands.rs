use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

use groupsync_core::{pairs, PairName, SyncDirection};

fn groupsync_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("groupsync"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn add_args<'a>(name: &'a str, extra: &[&'a str]) -> Vec<&'a str> {
    let mut args = vec![
        "pair",
        "add",
        name,
        "--local-group",
        "cn=eng,ou=groups",
        "--remote-group",
        "g-eng",
        "--local-store",
        "/srv/onprem.json",
        "--remote-store",
        "/srv/cloud.json",
    ];
    args.extend_from_slice(extra);
    args
}

#[test]
fn add_writes_pair_config() {
    let home = TempDir::new().expect("home");

    groupsync_cmd(home.path())
        .args(add_args("eng", &["--direction", "to-local"]))
        .assert()
        .success()
        .stdout(contains("✓ Pair 'eng'"));

    let pair = pairs::load_pair_at(home.path(), &PairName::from("eng")).expect("load");
    assert_eq!(pair.direction, SyncDirection::ToLocal);
    assert_eq!(pair.remote_group.0, "g-eng");
    assert_eq!(pair.local_store, Path::new("/srv/onprem.json"));
}

#[test]
fn add_defaults_to_pushing_to_the_cloud() {
    let home = TempDir::new().expect("home");

    groupsync_cmd(home.path())
        .args(add_args("eng", &[]))
        .assert()
        .success();

    let pair = pairs::load_pair_at(home.path(), &PairName::from("eng")).expect("load");
    assert_eq!(pair.direction, SyncDirection::ToRemote);
}

#[test]
fn add_rejects_unknown_direction() {
    let home = TempDir::new().expect("home");

    groupsync_cmd(home.path())
        .args(add_args("eng", &["--direction", "sideways"]))
        .assert()
        .failure()
        .stderr(contains("unknown direction 'sideways'"));
}

#[test]
fn add_rejects_path_like_names() {
    let home = TempDir::new().expect("home");

    groupsync_cmd(home.path())
        .args(add_args("../escape", &[]))
        .assert()
        .failure()
        .stderr(contains("invalid group pair name"));
}

#[test]
fn list_shows_pairs_sorted() {
    let home = TempDir::new().expect("home");
    for name in ["sales", "eng"] {
        groupsync_cmd(home.path())
            .args(add_args(name, &[]))
            .assert()
            .success();
    }

    let assert = groupsync_cmd(home.path())
        .args(["pair", "list"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    let eng = stdout.find("eng").expect("eng listed");
    let sales = stdout.find("sales").expect("sales listed");
    assert!(eng < sales, "pairs must be sorted by name:\n{stdout}");
    assert!(stdout.contains("to-remote"));
}

#[test]
fn list_on_empty_home_hints_at_add() {
    let home = TempDir::new().expect("home");

    groupsync_cmd(home.path())
        .args(["pair", "list"])
        .assert()
        .success()
        .stdout(contains("No pairs configured."));
}

#[test]
fn remove_deletes_config_and_fails_when_missing() {
    let home = TempDir::new().expect("home");
    groupsync_cmd(home.path())
        .args(add_args("eng", &[]))
        .assert()
        .success();

    groupsync_cmd(home.path())
        .args(["pair", "remove", "eng"])
        .assert()
        .success()
        .stdout(contains("Removed pair 'eng'"));
    assert!(!pairs::pair_path_at(home.path(), &PairName::from("eng")).exists());

    groupsync_cmd(home.path())
        .args(["pair", "remove", "eng"])
        .assert()
        .failure()
        .stderr(contains("failed to remove pair 'eng'").and(contains("not found")));
}
