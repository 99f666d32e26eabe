//! CLI argument and configuration validation tests. No network I/O.
//!
//! Every case here fails during settings resolution or context creation,
//! before any adapter is called.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A command isolated from the caller's config file and credentials.
fn cmd(work: &TempDir) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("stoa");
    cmd.env("STOA_CONFIG", work.path().join("absent.toml"))
        .env("BLOTATO_API_KEY", "test-blotato-key")
        .env("BLOTATO_ACCOUNT_ID", "acc-123")
        .env_remove("GEMINI_API_KEY")
        .env_remove("OPENAI_API_KEY")
        .env_remove("STOA_REPLAY")
        .env_remove("STOA_REC")
        .env_remove("STOA_TOPIC")
        .env_remove("STOA_MEDIA_UPLOAD_URL");
    cmd
}

#[test]
fn help_lists_flags() {
    let work = TempDir::new().unwrap();
    cmd(&work)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--platform").and(predicate::str::contains("--topic")));
}

#[test]
fn positional_arguments_are_rejected() {
    let work = TempDir::new().unwrap();
    cmd(&work).arg("Seneca").assert().failure();
}

#[test]
fn missing_publish_key_exits_with_error() {
    let work = TempDir::new().unwrap();
    cmd(&work)
        .env_remove("BLOTATO_API_KEY")
        .assert()
        .failure()
        .stderr(predicate::str::contains("BLOTATO_API_KEY"));
}

#[test]
fn missing_account_id_exits_with_error() {
    let work = TempDir::new().unwrap();
    cmd(&work)
        .env_remove("BLOTATO_ACCOUNT_ID")
        .assert()
        .failure()
        .stderr(predicate::str::contains("BLOTATO_ACCOUNT_ID"));
}

#[test]
fn missing_generation_key_exits_with_error() {
    let work = TempDir::new().unwrap();
    cmd(&work).assert().failure().stderr(predicate::str::contains("GEMINI_API_KEY"));
}

#[test]
fn openai_model_needs_openai_key() {
    let work = TempDir::new().unwrap();
    cmd(&work)
        .args(["--model", "gpt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn invalid_model_exits_with_error() {
    let work = TempDir::new().unwrap();
    cmd(&work)
        .args(["--model", "dall-e-3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown provider for model"));
}

#[test]
fn invalid_platform_exits_with_error() {
    let work = TempDir::new().unwrap();
    cmd(&work)
        .args(["-P", "twitter", "-P", "myspace"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported platform 'myspace'"));
}

#[test]
fn unparseable_config_exits_with_error() {
    let work = TempDir::new().unwrap();
    let config = work.path().join("stoa.toml");
    std::fs::write(&config, "[publish\nplatforms = ").unwrap();
    cmd(&work)
        .args(["--config", config.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));
}

#[test]
fn out_of_range_retry_config_exits_with_error() {
    let work = TempDir::new().unwrap();
    let config = work.path().join("stoa.toml");
    std::fs::write(&config, "[publish]\nmax_retries = 7\nbackoff_ms = 0\ntimeout_secs = 0\n")
        .unwrap();
    cmd(&work)
        .args(["--config", config.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid argument: max_retries 7"));
}

#[test]
fn errors_never_echo_the_publish_key() {
    let work = TempDir::new().unwrap();
    cmd(&work)
        .assert()
        .failure()
        .stderr(predicate::str::contains("test-blotato-key").not())
        .stdout(predicate::str::contains("test-blotato-key").not());
}
