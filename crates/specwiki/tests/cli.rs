//! CLI regression tests for the `specwiki` binary.
//!
//! These tests invoke the binary as a subprocess to catch regressions in flag
//! names, exit codes, and output files.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Returns an assert_cmd Command wrapping the `specwiki` binary.
fn specwiki() -> Command {
    // cargo_bin is deprecated for custom build-dir setups; fine for standard workspace use.
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("specwiki").expect("specwiki binary not found");
    cmd.env_remove("RUST_LOG")
        .env_remove("SPECWIKI_LOG_LEVEL")
        .env_remove("SPECWIKI_LOG_FORMAT");
    cmd
}

/// Absolute path to the shared test fixtures directory.
fn fixtures() -> PathBuf {
    // CARGO_MANIFEST_DIR = .../crates/specwiki
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("crates/")
        .parent()
        .expect("workspace root")
        .join("tests/fixtures")
}

// ---------------------------------------------------------------------------
// specwiki convert
// ---------------------------------------------------------------------------

#[test]
fn convert_writes_markup() {
    let tmp = TempDir::new().expect("temp dir");
    let output = tmp.path().join("api.txt");

    specwiki()
        .args(["convert", "--in"])
        .arg(fixtures().join("petstore.yaml"))
        .arg("--out")
        .arg(&output)
        .assert()
        .success();

    let text = std::fs::read_to_string(&output).expect("output written");
    assert!(text.starts_with("h3. Pets\nh4. List pets\nReturns every pet in the store.\n"));
    assert!(text.contains("*Rate Limit*: 10 per minute\n"));
    assert!(text.contains("|{{status}}|{{available}} \\| {{sold}}||\n"));
    assert!(text.contains("||Name||Type||Mandatory||Description||\n"));
    assert!(text.ends_with("h3. API Specifics\nh4. Health check\n*Method*: {noformat}GET /health{noformat}\n\n\n"));
}

#[test]
fn convert_short_flags() {
    let tmp = TempDir::new().expect("temp dir");
    let output = tmp.path().join("out.txt");

    specwiki()
        .arg("convert")
        .arg("-i")
        .arg(fixtures().join("petstore.yaml"))
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    assert!(output.exists());
}

#[test]
fn convert_uses_default_paths() {
    let tmp = TempDir::new().expect("temp dir");
    std::fs::copy(fixtures().join("petstore.yaml"), tmp.path().join("api.yaml"))
        .expect("copy fixture");

    specwiki()
        .current_dir(tmp.path())
        .arg("convert")
        .assert()
        .success();

    assert!(tmp.path().join("api.txt").exists());
}

#[test]
fn convert_json_format_writes_model() {
    let tmp = TempDir::new().expect("temp dir");
    let output = tmp.path().join("api.json");

    specwiki()
        .args(["convert", "--format", "json", "--in"])
        .arg(fixtures().join("petstore.yaml"))
        .arg("--out")
        .arg(&output)
        .assert()
        .success();

    let s = std::fs::read_to_string(&output).expect("output written");
    let v: serde_json::Value = serde_json::from_str(&s).expect("output should be valid JSON");
    assert_eq!(v["groups"]["Pets"]["operations"][1]["summary"], "Add a pet");
    assert!(v["definitions"].get("Owner").is_some());
}

#[test]
fn convert_parse_error_exits_one_without_output() {
    let tmp = TempDir::new().expect("temp dir");
    let output = tmp.path().join("api.txt");

    specwiki()
        .args(["convert", "--in"])
        .arg(fixtures().join("invalid-parse-error.yaml"))
        .arg("--out")
        .arg(&output)
        .assert()
        .failure()
        .code(1)
        .stderr(contains("document error"));

    assert!(!output.exists());
}

#[test]
fn convert_shape_error_names_the_key() {
    let tmp = TempDir::new().expect("temp dir");

    specwiki()
        .args(["convert", "--in"])
        .arg(fixtures().join("invalid-shape-error.yaml"))
        .arg("--out")
        .arg(tmp.path().join("api.txt"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("paths./pets.get.parameters"));
}

#[test]
fn convert_missing_file_exits_one() {
    let tmp = TempDir::new().expect("temp dir");

    specwiki()
        .args(["convert", "--in", "this-file-does-not-exist.yaml", "--out"])
        .arg(tmp.path().join("api.txt"))
        .assert()
        .failure()
        .code(1);
}

#[test]
fn convert_unknown_format_exits_two() {
    // clap returns exit code 2 for invalid argument values
    specwiki()
        .args(["convert", "--format", "html"])
        .assert()
        .failure()
        .code(2);
}

// ---------------------------------------------------------------------------
// global flags and serve
// ---------------------------------------------------------------------------

#[test]
fn invalid_log_format_exits_two() {
    specwiki()
        .args(["--log-format", "xml", "convert"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("invalid log format"));
}

#[test]
fn serve_invalid_listen_address_exits_one() {
    specwiki()
        .args(["serve", "--listen", "not-an-address"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("invalid listen address"));
}

#[test]
fn help_lists_subcommands() {
    specwiki()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("convert"))
        .stdout(contains("serve"));
}
