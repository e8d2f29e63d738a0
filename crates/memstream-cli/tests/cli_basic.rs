//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against a throwaway data directory.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-q", "-p", "memstream-cli", "--"])
        .args(args)
        .env("MEMSTREAM_DATA_DIR", data_dir)
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_ok(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    stdout
}

#[test]
fn test_config_get_default() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_ok(dir.path(), &["config", "get", "escalation.cool_down_secs"]);
    assert_eq!(out.trim(), "10");
    assert!(dir.path().join("config.toml").exists());
}

#[test]
fn test_config_set_then_get() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["config", "set", "share_prompt.max_delay_secs", "90"]);
    let out = run_ok(dir.path(), &["config", "get", "share_prompt.max_delay_secs"]);
    assert_eq!(out.trim(), "90");
}

#[test]
fn test_config_list_section() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_ok(dir.path(), &["config", "list", "escalation"]);
    assert!(out.lines().all(|l| l.starts_with("escalation.")));
    assert!(out.lines().any(|l| l == "escalation.cool_down_secs = 10"));

    let json = run_ok(dir.path(), &["config", "list", "share_prompt", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["enabled"], true);

    let (_, stderr, code) = run_cli(dir.path(), &["config", "list", "theme"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown section"));
}

#[test]
fn test_config_reset_single_section() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_ok(dir.path(), &["config", "set", "escalation.cool_down_secs", "600"]);
    assert_eq!(out.trim(), "escalation.cool_down_secs = 600");
    run_ok(dir.path(), &["config", "set", "share_prompt.max_delay_secs", "90"]);

    run_ok(dir.path(), &["config", "reset", "escalation"]);

    let cool = run_ok(dir.path(), &["config", "get", "escalation.cool_down_secs"]);
    assert_eq!(cool.trim(), "10");
    let max = run_ok(dir.path(), &["config", "get", "share_prompt.max_delay_secs"]);
    assert_eq!(max.trim(), "90");
}

#[test]
fn test_config_unknown_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "get", "nope.nope"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_rank_fresh_state() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_ok(dir.path(), &["rank", "photo-1", "--json"]);
    let ranking: serde_json::Value = serde_json::from_str(&out).unwrap();
    let entries = ranking.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["priority"], 4);
    assert_eq!(entries[1]["priority"], 5);
    assert_eq!(entries[1]["recipient"]["value"]["name"], "Your Parents");
}

#[test]
fn test_tagged_contact_ranks_first() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(
        dir.path(),
        &["contacts", "tag", "photo-1", "Grandma", "--relationship", "family"],
    );
    let out = run_ok(dir.path(), &["rank", "photo-1"]);
    let first = out.lines().next().unwrap();
    assert!(first.starts_with("1"));
    assert!(first.contains("Grandma"));
    // Grandma is already ranked, so the family slot falls back to the placeholder.
    assert!(out.lines().last().unwrap().contains("Your Parents"));
}

#[test]
fn test_chat_list_json() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["contacts", "chat", "Sam"]);
    run_ok(dir.path(), &["contacts", "chat", "Alex"]);
    run_ok(dir.path(), &["contacts", "chat", "Sam"]);
    let out = run_ok(dir.path(), &["contacts", "list", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    let chats = value["chat_activities"].as_array().unwrap();
    assert_eq!(chats.len(), 2);
    assert_eq!(chats[0]["contact"]["name"], "Sam");
    assert_eq!(value["current_chat"]["name"], "Sam");
}

#[test]
fn test_snooze_set_status_clear() {
    let dir = tempfile::tempdir().unwrap();
    assert!(run_ok(dir.path(), &["snooze", "status"]).contains("not snoozing"));
    run_ok(dir.path(), &["snooze", "set", "600"]);
    assert!(run_ok(dir.path(), &["snooze", "status"]).starts_with("snoozing"));
    run_ok(dir.path(), &["snooze", "clear"]);
    assert!(run_ok(dir.path(), &["snooze", "status"]).contains("not snoozing"));
}

#[test]
fn test_post_without_token_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["post", "instagram", "--text", "hi"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("No token for instagram"));
}

#[test]
fn test_auth_login_connects_platform() {
    let dir = tempfile::tempdir().unwrap();
    for (key, value) in [
        ("oauth.success_rate", "1"),
        ("oauth.latency_min_ms", "0"),
        ("oauth.latency_max_ms", "0"),
    ] {
        run_ok(dir.path(), &["config", "set", key, value]);
    }

    assert_eq!(
        run_ok(dir.path(), &["auth", "twitter", "status"]).trim(),
        "not authenticated"
    );
    let out = run_ok(dir.path(), &["auth", "twitter", "login"]);
    assert!(out.contains("https://twitter.com/i/oauth2/authorize?"));
    assert!(out.contains("connected as user_twitter_"));
    assert_eq!(
        run_ok(dir.path(), &["auth", "twitter", "status"]).trim(),
        "authenticated"
    );

    let out = run_ok(dir.path(), &["rank", "photo-1"]);
    assert!(out.lines().next().unwrap().contains("Twitter/X"));

    run_ok(dir.path(), &["auth", "twitter", "logout"]);
    let list = run_ok(dir.path(), &["auth", "list"]);
    assert!(list.lines().any(|l| l.starts_with("twitter") && l.ends_with("not connected")));
}

#[test]
fn test_run_with_empty_photo_set_stops() {
    let dir = tempfile::tempdir().unwrap();
    let photos = dir.path().join("photos.json");
    std::fs::write(&photos, "[]").unwrap();
    let out = run_ok(
        dir.path(),
        &["run", "--photos", photos.to_str().unwrap(), "--duration", "1"],
    );
    assert!(out.contains("no photos"));
}
