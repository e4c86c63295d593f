//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;

fn msgboard() -> Command {
    let mut cmd = Command::cargo_bin("msgboard").unwrap();
    // Keep the developer's own config and env out of the way
    cmd.env("MSGBOARD_CONFIG", "/nonexistent/msgboard/config.toml")
        .env_remove("MSGBOARD_ENDPOINT")
        .env_remove("MSGBOARD_USERNAME");
    cmd
}

// === Help Output ===

#[test]
fn test_top_level_help_lists_commands() {
    msgboard()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("upvote"))
        .stdout(predicate::str::contains("comments"))
        .stdout(predicate::str::contains("tui"));
}

#[test]
fn test_post_help() {
    msgboard()
        .arg("post")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Image or video to attach"));
}

#[test]
fn test_list_help() {
    msgboard()
        .arg("list")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Output format"));
}

#[test]
fn test_comment_help() {
    msgboard()
        .arg("comment")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Message ID to comment on"));
}

// === Config ===

#[test]
fn test_config_path_honours_env() {
    msgboard()
        .env("MSGBOARD_CONFIG", "/tmp/somewhere/board.toml")
        .arg("config")
        .arg("path")
        .assert()
        .success()
        .stdout(predicate::str::contains("/tmp/somewhere/board.toml"));
}

#[test]
fn test_config_init_then_show() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    msgboard()
        .env("MSGBOARD_CONFIG", &path)
        .args(["config", "init", "--username", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config"));

    msgboard()
        .env("MSGBOARD_CONFIG", &path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("username = \"alice\""))
        .stdout(predicate::str::contains("http://localhost:8800"));

    // Second init refuses without --force
    msgboard()
        .env("MSGBOARD_CONFIG", &path)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn test_config_show_without_file_points_at_init() {
    msgboard()
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("msgboard config init"));
}

// === Board Commands ===

#[test]
fn test_list_requires_username() {
    msgboard()
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Username required"));
}

#[test]
fn test_list_against_unreachable_store_fails() {
    msgboard()
        .args(["--username", "alice", "--endpoint", "http://127.0.0.1:9", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load the board"));
}

#[test]
fn test_post_without_content_fails() {
    msgboard()
        .args(["--username", "alice", "post"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No content provided for post"));
}

// === Completions ===

#[test]
fn test_completions_bash() {
    msgboard()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("msgboard"));
}
