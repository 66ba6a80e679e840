//! CLI surface tests
//!
//! The passphrase is supplied through `PROMPTVAULT_PASSPHRASE` so no prompt
//! is involved; interactive unlock itself is covered by the library tests in
//! `services::session`.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PASSPHRASE: &str = "Str0ng!Passw0rd123";

fn promptvault(vault_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("promptvault").unwrap();
    cmd.env("PROMPTVAULT_DATA_DIR", vault_dir.path());
    cmd
}

fn unlocked(vault_dir: &TempDir) -> Command {
    let mut cmd = promptvault(vault_dir);
    cmd.env("PROMPTVAULT_PASSPHRASE", PASSPHRASE);
    cmd
}

fn init_vault(vault_dir: &TempDir) {
    unlocked(vault_dir).arg("init").assert().success();
}

#[test]
fn status_reports_missing_vault() {
    let vault_dir = TempDir::new().unwrap();

    promptvault(&vault_dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("not set up"));
}

#[test]
fn list_without_vault_points_at_init() {
    let vault_dir = TempDir::new().unwrap();

    promptvault(&vault_dir)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("promptvault init"));
}

#[test]
fn settings_show_defaults_without_unlock() {
    let vault_dir = TempDir::new().unwrap();

    promptvault(&vault_dir)
        .arg("settings")
        .assert()
        .success()
        .stdout(predicate::str::contains("60 minutes"))
        .stdout(predicate::str::contains("15 minutes"));
}

#[test]
fn settings_rejects_out_of_range_timeout() {
    let vault_dir = TempDir::new().unwrap();

    promptvault(&vault_dir)
        .args(["settings", "--session-timeout", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("between 5 and 480"));
}

#[test]
fn init_rejects_weak_passphrase() {
    let vault_dir = TempDir::new().unwrap();

    promptvault(&vault_dir)
        .env("PROMPTVAULT_PASSPHRASE", "short")
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("too weak"));

    // Nothing was set up
    promptvault(&vault_dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("not set up"));
}

#[test]
fn add_list_show_remove_round_trip() {
    let vault_dir = TempDir::new().unwrap();
    init_vault(&vault_dir);

    unlocked(&vault_dir)
        .args(["add", "Evening broadcast"])
        .write_stdin("Good evening, everyone.")
        .assert()
        .success()
        .stdout(predicate::str::contains("Added script Evening broadcast"));

    let listing = unlocked(&vault_dir).arg("list").assert().success();
    let stdout = String::from_utf8(listing.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("Evening broadcast"));
    let id = stdout.split_whitespace().next().unwrap().to_string();

    unlocked(&vault_dir)
        .args(["show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Good evening, everyone."));

    unlocked(&vault_dir)
        .args(["remove", &id])
        .assert()
        .success();

    unlocked(&vault_dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No scripts"));
}

#[test]
fn wrong_passphrase_is_rejected() {
    let vault_dir = TempDir::new().unwrap();
    init_vault(&vault_dir);

    promptvault(&vault_dir)
        .env("PROMPTVAULT_PASSPHRASE", "WrongPass!123")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Incorrect passphrase"));
}

#[test]
fn script_content_is_not_plaintext_on_disk() {
    let vault_dir = TempDir::new().unwrap();
    init_vault(&vault_dir);

    unlocked(&vault_dir)
        .args(["add", "Launch"])
        .write_stdin("the secret launch line")
        .assert()
        .success();

    let raw = std::fs::read_to_string(vault_dir.path().join("data").join("scripts.json")).unwrap();
    assert!(!raw.contains("the secret launch line"));
}

#[test]
fn help_lists_subcommands() {
    let vault_dir = TempDir::new().unwrap();

    promptvault(&vault_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("lock"));
}
