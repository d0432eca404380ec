//! CLI integration tests for drone-migrate.
//!
//! These tests verify command-line argument parsing, help output,
//! and exit codes for various error conditions.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a command for the drone-migrate binary with a clean environment.
fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("drone-migrate").unwrap();
    for var in [
        "SOURCE_DATABASE_DRIVER",
        "SOURCE_DATABASE_DATASOURCE",
        "TARGET_DATABASE_DRIVER",
        "TARGET_DATABASE_DATASOURCE",
        "TARGET_DATABASE_SSL_MODE",
        "SCM_DRIVER",
        "SCM_SERVER",
        "DRONE_SERVER",
        "S3_BUCKET",
        "S3_PREFIX",
        "S3_ENDPOINT",
        "S3_PATH_STYLE",
        "DRONE_DATABASE_SECRET",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    let output = cmd().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    for command in [
        "setup-database",
        "migrate-users",
        "migrate-repos",
        "migrate-builds",
        "migrate-stages",
        "migrate-logs",
        "migrate-logs-s3",
        "migrate-secrets",
        "migrate-registries",
        "update-repos",
        "activate-repos",
        "encrypt-secrets",
    ] {
        assert!(stdout.contains(command), "missing {}", command);
    }
}

#[test]
fn test_help_shows_env_names() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("SOURCE_DATABASE_DRIVER"))
        .stdout(predicate::str::contains("TARGET_DATABASE_DATASOURCE"))
        .stdout(predicate::str::contains("DRONE_DATABASE_SECRET"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("drone-migrate"));
}

#[test]
fn test_missing_subcommand() {
    cmd().assert().failure();
}

// =============================================================================
// Configuration Errors (exit 2)
// =============================================================================

#[test]
fn test_missing_source_configuration() {
    cmd()
        .arg("migrate-users")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("source.driver is required"));
}

#[test]
fn test_unknown_driver() {
    cmd()
        .args([
            "migrate-users",
            "--source-driver",
            "oracle",
            "--source-datasource",
            "x",
            "--target-driver",
            "sqlite3",
            "--target-datasource",
            ":memory:",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown database driver"));
}

#[test]
fn test_unsupported_scm_driver() {
    cmd()
        .args(["update-repos", "--scm-driver", "stash"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("stash"));
}

#[test]
fn test_s3_bucket_required() {
    cmd()
        .arg("migrate-logs-s3")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("s3.bucket is required"));
}

#[test]
fn test_encryption_key_size() {
    cmd()
        .args([
            "encrypt-secrets",
            "--target-driver",
            "sqlite3",
            "--target-datasource",
            ":memory:",
            "--encryption-key",
            "too-short",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("32 bytes"));
}

#[test]
fn test_encryption_key_from_env() {
    cmd()
        .args([
            "encrypt-secrets",
            "--target-driver",
            "sqlite3",
            "--target-datasource",
            ":memory:",
        ])
        .env("DRONE_DATABASE_SECRET", "sixteen-bytes-xx")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("got 16"));
}

#[test]
fn test_missing_config_file() {
    cmd()
        .args(["--config", "/nonexistent/migrate.yaml", "setup-database"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("IO error"));
}

#[test]
fn test_invalid_yaml_config() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "source: [unclosed").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "setup-database"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("YAML error"));
}

// =============================================================================
// Successful Runs
// =============================================================================

#[test]
fn test_setup_database_in_memory() {
    cmd()
        .args([
            "setup-database",
            "--target-driver",
            "sqlite3",
            "--target-datasource",
            ":memory:",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Applied 25 schema migrations"));
}

#[test]
fn test_config_file_sections() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "target:\n  driver: sqlite3\n  datasource: \":memory:\"").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "setup-database"])
        .assert()
        .success();
}

#[test]
fn test_invalid_log_format() {
    cmd()
        .args(["--log-format", "xml", "setup-database"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown log format"));
}
