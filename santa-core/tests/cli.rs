//! Process-level tests for `santa-cli`: exit codes and output streams.

#![allow(deprecated)] // Command::cargo_bin

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo::CommandCargoExt;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn repo_path(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join(relative)
}

fn generate(template: &Path, out: &Path) -> Command {
    let mut cmd = Command::cargo_bin("santa-cli").unwrap();
    cmd.env_remove("RUST_LOG")
        .arg("generate")
        .arg("--template")
        .arg(template)
        .arg("--tree")
        .arg(repo_path("assets/tree.png"))
        .arg("--seal")
        .arg(repo_path("assets/wax_seal_small.jpg"))
        .arg("--output-dir")
        .arg(out);
    cmd
}

#[test]
fn test_generate_success_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("build");

    generate(&repo_path("templates/certificate.html"), &out)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Created"))
        .stdout(predicate::str::contains("lia_certificate.html"))
        .stderr(predicate::str::contains("Error").not());

    assert!(out.join("lia_certificate.html").exists());
    assert!(out.join("daniel_certificate.html").exists());
}

#[test]
fn test_missing_template_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("build");

    generate(&dir.path().join("missing.html"), &out)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("missing.html"));

    assert!(!out.exists());
}

#[test]
fn test_missing_field_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("build");
    let records = dir.path().join("records.json");
    fs::write(
        &records,
        r#"[
            {"name": "A", "message": "<p>a</p>", "gift": "R1", "gift_note": "n", "filename": "a.html"},
            {"name": "B", "message": "<p>b</p>", "gift": "R2", "filename": "b.html"}
        ]"#,
    )
    .unwrap();

    generate(&repo_path("templates/certificate.html"), &out)
        .arg("--records")
        .arg(&records)
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("gift_note"));

    assert!(!out.join("a.html").exists());
}

#[test]
fn test_duplicate_filenames_exit_two() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("build");
    let records = dir.path().join("records.json");
    fs::write(
        &records,
        r#"[
            {"name": "A", "message": "<p>a</p>", "gift": "R1", "gift_note": "n", "filename": "same.html"},
            {"name": "B", "message": "<p>b</p>", "gift": "R2", "gift_note": "n", "filename": "same.html"}
        ]"#,
    )
    .unwrap();

    generate(&repo_path("templates/certificate.html"), &out)
        .arg("--records")
        .arg(&records)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("same.html"));

    assert!(!out.join("same.html").exists());
}

#[test]
fn test_json_report_on_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("build");

    let assert = generate(&repo_path("templates/certificate.html"), &out)
        .arg("--format")
        .arg("json")
        .assert()
        .code(0);

    let report: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(report["success"], true);
    assert_eq!(report["documents"].as_array().unwrap().len(), 2);
}

#[test]
fn test_rust_log_overrides_default_level() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("build");

    generate(&repo_path("templates/certificate.html"), &out)
        .env("RUST_LOG", "debug")
        .assert()
        .code(0)
        .stderr(predicate::str::contains("wrote certificate"));
}

#[test]
fn test_default_level_hides_progress_logs() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("build");

    generate(&repo_path("templates/certificate.html"), &out)
        .assert()
        .code(0)
        .stderr(predicate::str::contains("wrote certificate").not());
}
