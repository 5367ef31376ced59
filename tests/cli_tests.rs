//! CLI integration tests for the faultlens binary
//!
//! These tests run the compiled binary against error JSON written to temporary
//! files or piped through stdin.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

const ACCESS_DENIED: &str =
    r#"{"typeName": "java.sql.SQLException", "message": "Access denied for user"}"#;

/// Get a Command instance for the faultlens binary
#[allow(deprecated)]
fn faultlens_cmd() -> Command {
    let mut cmd = Command::cargo_bin("faultlens").expect("Failed to find faultlens binary");
    cmd.env_remove("NO_COLOR").env_remove("RUST_LOG");
    cmd
}

fn temp_file(contents: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temp file");
    file
}

// ============================================================================
// --help / --version
// ============================================================================

#[test]
fn test_help_lists_commands() {
    faultlens_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Classify raised errors and explain startup failures",
        ))
        .stdout(predicate::str::contains("classify"))
        .stdout(predicate::str::contains("report"))
        .stdout(predicate::str::contains("analyzers"));
}

#[test]
fn test_version_flag() {
    faultlens_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_subcommand_fails() {
    faultlens_cmd().assert().failure();
}

// ============================================================================
// classify
// ============================================================================

#[test]
fn test_classify_from_file() {
    let input = temp_file(ACCESS_DENIED, ".json");

    faultlens_cmd()
        .arg("classify")
        .arg("--input")
        .arg(input.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#""errorCode": "DB_AUTHENTICATION_FAILURE""#,
        ))
        .stdout(predicate::str::contains(r#""recoverable": false"#))
        .stdout(predicate::str::contains(r#""category": "DATABASE""#));
}

#[test]
fn test_classify_from_stdin() {
    faultlens_cmd()
        .arg("classify")
        .write_stdin(
            r#"{"typeName": "org.mockito.exceptions.verification.WantedButNotInvoked",
                "message": "Verification failed, wanted but not invoked: repository.save()"}"#,
        )
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#""errorCode": "TEST_VERIFICATION_FAILURE""#,
        ))
        .stdout(predicate::str::contains(r#""testFramework": "Mockito""#));
}

#[test]
fn test_classify_response_format_with_dev_profile() {
    let input = temp_file(ACCESS_DENIED, ".json");

    faultlens_cmd()
        .args(["classify", "--format", "response", "--instance", "/api/users"])
        .args(["--profile", "dev"])
        .arg("--input")
        .arg(input.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""instance": "/api/users""#))
        .stdout(predicate::str::contains(r#""code": "DB_AUTHENTICATION_FAILURE""#))
        .stdout(predicate::str::contains("debugInformation"));
}

#[test]
fn test_classify_response_format_without_profile_hides_debug() {
    faultlens_cmd()
        .args(["classify", "--format", "response"])
        .write_stdin(ACCESS_DENIED)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""status": 500"#))
        .stdout(predicate::str::contains("debugInformation").not());
}

#[test]
fn test_classify_invalid_json_fails() {
    faultlens_cmd()
        .arg("classify")
        .write_stdin("not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid error JSON"));
}

#[test]
fn test_classify_with_config_file() {
    let config = temp_file("[database_analyzer]\nenabled = false\n", ".toml");

    faultlens_cmd()
        .arg("--config")
        .arg(config.path())
        .arg("classify")
        .write_stdin(ACCESS_DENIED)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""errorCode": "UNKNOWN_ERROR""#));
}

#[test]
fn test_classify_with_environment_override() {
    faultlens_cmd()
        .env("FAULTLENS__DATABASE_ANALYZER__ENABLED", "false")
        .arg("classify")
        .write_stdin(ACCESS_DENIED)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""errorCode": "UNKNOWN_ERROR""#));
}

#[test]
fn test_classify_response_profiles_from_environment() {
    faultlens_cmd()
        .env("FAULTLENS__RESPONSE__ACTIVE_PROFILES", "dev")
        .args(["classify", "--format", "response"])
        .write_stdin(ACCESS_DENIED)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""code": "DB_AUTHENTICATION_FAILURE""#))
        .stdout(predicate::str::contains("debugInformation"));
}

#[test]
fn test_missing_config_file_fails() {
    faultlens_cmd()
        .args(["--config", "/nonexistent/faultlens.toml", "analyzers"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration file not found"));
}

// ============================================================================
// report
// ============================================================================

#[test]
fn test_report_plain() {
    faultlens_cmd()
        .args(["report", "--no-color"])
        .write_stdin(ACCESS_DENIED)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Database Authentication Failure\n",
        ))
        .stdout(predicate::str::contains("Error Code: DB_AUTHENTICATION_FAILURE"))
        .stdout(predicate::str::contains(
            "1. Verify database credentials and user permissions",
        ))
        .stdout(predicate::str::contains("\x1b[").not());
}

#[test]
fn test_report_respects_no_color_env() {
    faultlens_cmd()
        .env("NO_COLOR", "1")
        .arg("report")
        .write_stdin(ACCESS_DENIED)
        .assert()
        .success()
        .stdout(predicate::str::contains("\x1b[").not());
}

#[test]
fn test_report_unknown_startup_failure() {
    faultlens_cmd()
        .args(["report", "--no-color"])
        .write_stdin(r#"{"typeName": "java.lang.IllegalArgumentException"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("Unknown Startup Failure"))
        .stdout(predicate::str::contains("Error Code: UNKNOWN_STARTUP_FAILURE"))
        .stdout(predicate::str::contains(
            "Root Cause: IllegalArgumentException: No message available",
        ));
}

#[test]
fn test_report_disabled() {
    let config = temp_file("[startup_analyzer]\nenabled = false\n", ".toml");

    faultlens_cmd()
        .arg("--config")
        .arg(config.path())
        .arg("report")
        .write_stdin(ACCESS_DENIED)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Startup failure reporting is disabled"));
}

// ============================================================================
// analyzers
// ============================================================================

#[test]
fn test_analyzers_lists_both_orders() {
    faultlens_cmd()
        .args(["analyzers", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Request-time order (lowest first):\n    75  TestExecution\n    80  TestContext\n   100  Database\n",
        ))
        .stdout(predicate::str::contains(
            "Startup order (highest first):\n   100  Database\n    80  TestContext\n    75  TestExecution\n",
        ));
}
