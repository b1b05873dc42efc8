//! End-to-end tests for the has-comments binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn has_comments(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("has-comments").unwrap();
    cmd.current_dir(dir)
        .env_remove("HAS_COMMENTS_CONFIG")
        .arg("--no-color");
    cmd
}

fn init_project() -> TempDir {
    let temp = tempfile::tempdir().unwrap();
    has_comments(temp.path()).arg("init").assert().success();
    temp
}

fn write_owner_config(dir: &Path, owner_section: &str) {
    let config = format!(
        "[storage]\ndata_dir = \".has-comments/data\"\n\n[owners.Post]\n{}\n",
        owner_section
    );
    fs::create_dir_all(dir.join(".has-comments")).unwrap();
    fs::write(dir.join(".has-comments/config.toml"), config).unwrap();
}

/// Post as arjan on Post#1 and return the stored comment
fn post_json(dir: &Path, body: &str) -> serde_json::Value {
    let output = has_comments(dir)
        .args([
            "post", "-t", "Post", "-o", "1", "-n", "arjan", "-e", "arjan@arjan.com", "-b", body,
            "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "post failed: {:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}

fn show_json(dir: &Path, id: &str) -> serde_json::Value {
    let output = has_comments(dir)
        .args(["show", id, "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_init_creates_config() {
    let temp = init_project();
    let config = temp.path().join(".has-comments/config.toml");
    assert!(config.exists());

    has_comments(temp.path())
        .arg("init")
        .assert()
        .success()
        .stderr(predicate::str::contains("already initialized"));

    has_comments(temp.path())
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_config_validate_reports_errors() {
    let temp = tempfile::tempdir().unwrap();
    has_comments(temp.path())
        .args(["config", "validate"])
        .assert()
        .failure();

    write_owner_config(temp.path(), "require_approval = 3");
    has_comments(temp.path())
        .args(["config", "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_first_comment_pending_then_auto_approved() {
    let temp = init_project();

    let first = post_json(temp.path(), "First!");
    assert!(first["approved_at"].is_null());
    assert_eq!(first["spam"], false);

    let second = post_json(temp.path(), "Back again");
    assert!(!second["approved_at"].is_null());

    let output = has_comments(temp.path())
        .args(["list", "-t", "Post", "-o", "1", "--json"])
        .output()
        .unwrap();
    let listed: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listed.len(), 2);

    let output = has_comments(temp.path())
        .args(["list", "-t", "Post", "-o", "1", "--pending", "--json"])
        .output()
        .unwrap();
    let pending: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["id"], first["id"]);
}

#[test]
fn test_invalid_comment_lists_every_violation() {
    let temp = init_project();

    has_comments(temp.path())
        .args(["post", "-t", "Post", "-o", "1", "-b", "", "-n", "ab", "-e", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("body can't be blank"))
        .stderr(predicate::str::contains("email is invalid"))
        .stderr(predicate::str::contains("Comment was not saved"));

    has_comments(temp.path())
        .args(["list", "-t", "Post", "-o", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No comments found."));
}

#[test]
fn test_closed_owner_rejects_comment() {
    let temp = tempfile::tempdir().unwrap();
    write_owner_config(temp.path(), "open = false");

    has_comments(temp.path())
        .args(["post", "-t", "Post", "-o", "1", "--user-id", "4", "-b", "Hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("You cannot comment on this object."));
}

#[test]
fn test_predicate_supplies_policy_value() {
    let temp = tempfile::tempdir().unwrap();
    write_owner_config(temp.path(), "authorisation = \"members_only?\"");

    has_comments(temp.path())
        .args(["post", "-t", "Post", "-o", "1", "--user-id", "4", "-b", "Hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("members_only?"));

    has_comments(temp.path())
        .args([
            "post",
            "-t",
            "Post",
            "-o",
            "1",
            "--user-id",
            "4",
            "-b",
            "Hi",
            "-p",
            "members_only?=false",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "You are not allowed to comment on this object.",
        ));

    has_comments(temp.path())
        .args([
            "post",
            "-t",
            "Post",
            "-o",
            "1",
            "--user-id",
            "4",
            "-b",
            "Hi",
            "-p",
            "members_only?=true",
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("would be accepted"));
}

#[test]
fn test_approve_and_unapprove() {
    let temp = tempfile::tempdir().unwrap();
    write_owner_config(temp.path(), "require_approval = true");

    let comment = post_json(temp.path(), "Please moderate me");
    let id = comment["id"].as_str().unwrap().to_string();
    assert!(comment["approved_at"].is_null());

    has_comments(temp.path())
        .args(["approve", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Approved comment"))
        .stdout(predicate::str::contains("has 1 approved comments"));
    let approved_at = show_json(temp.path(), &id)["approved_at"].clone();
    assert!(!approved_at.is_null());

    has_comments(temp.path())
        .args(["approve", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("already approved"));
    assert_eq!(show_json(temp.path(), &id)["approved_at"], approved_at);

    has_comments(temp.path())
        .args(["unapprove", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("has 0 approved comments"));
    assert!(show_json(temp.path(), &id)["approved_at"].is_null());
}

#[test]
fn test_spam_and_ham_without_service() {
    let temp = init_project();
    let comment = post_json(temp.path(), "Cheap watches");
    let id = comment["id"].as_str().unwrap().to_string();

    has_comments(temp.path())
        .args(["spam", &id, "--ip", "10.0.0.1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("as spam"));
    assert_eq!(show_json(temp.path(), &id)["spam"], true);

    has_comments(temp.path())
        .args(["spam", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("already marked as spam"));

    has_comments(temp.path())
        .args(["ham", &id])
        .assert()
        .success();
    assert_eq!(show_json(temp.path(), &id)["spam"], false);
}

#[test]
fn test_show_unknown_comment() {
    let temp = init_project();
    has_comments(temp.path())
        .args(["show", "not-a-uuid"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid comment ID"));

    has_comments(temp.path())
        .args(["show", "00000000-0000-4000-8000-000000000000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Comment not found"));
}

#[test]
fn test_purge_requires_confirmation() {
    let temp = init_project();
    post_json(temp.path(), "Soon gone");

    has_comments(temp.path())
        .args(["purge", "-t", "Post", "-o", "1"])
        .assert()
        .failure();

    has_comments(temp.path())
        .args(["purge", "-t", "Post", "-o", "1", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 1 comments of Post#1"));

    has_comments(temp.path())
        .args(["list", "-t", "Post", "-o", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No comments found."));
}

#[test]
fn test_doctor_offline() {
    let temp = init_project();
    has_comments(temp.path())
        .args(["doctor", "--offline"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Spam Service"))
        .stdout(predicate::str::contains("disabled (no key)"));
}
