//! Tests for the `hiremeter` binary's user-facing exits.
//!
//! These run the built binary in an empty working directory (so no `.env` is
//! picked up) and point the Gemini client at a local listener that must never
//! see a connection.

#![cfg(feature = "cli")]

use std::net::TcpListener;
use std::process::{Command, Output};

const BIN: &str = env!("CARGO_BIN_EXE_hiremeter");

/// Run the binary with `args`, asserting the provider endpoint is never hit.
fn run(args: &[&str]) -> Output {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let workdir = tempfile::tempdir().unwrap();

    let output = Command::new(BIN)
        .args(args)
        .args(["--api-key", "test-key", "--api-base-url", &base_url])
        .current_dir(workdir.path())
        .env_remove("RUST_LOG")
        .env_remove("HIREMETER_PROVIDER")
        .env_remove("HIREMETER_JSON")
        .env_remove("HIREMETER_QUIET")
        .env("HIREMETER_NO_DOWNLOAD", "true")
        .output()
        .unwrap();

    assert!(
        listener.accept().is_err(),
        "provider endpoint was contacted"
    );
    output
}

fn assert_upload_warning(output: &Output) {
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(2), "stderr: {stderr}");
    assert!(stderr.contains("⚠"), "stderr: {stderr}");
    assert!(stderr.contains("Please upload your resume."), "stderr: {stderr}");
    assert!(output.stdout.is_empty(), "stdout: {}", String::from_utf8_lossy(&output.stdout));
}

#[test]
fn review_without_resume_warns_and_exits_2() {
    let output = run(&["review", "--job", "Senior Go developer"]);
    assert_upload_warning(&output);
}

#[test]
fn match_without_resume_warns_and_exits_2() {
    let output = run(&["match", "--job", "Senior Go developer"]);
    assert_upload_warning(&output);
}

#[test]
fn missing_resume_file_is_a_warning() {
    let output = run(&["review", "--resume", "no-such-cv.pdf", "--job", "x"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(2), "stderr: {stderr}");
    assert!(stderr.contains("not found"), "stderr: {stderr}");
    assert!(output.stdout.is_empty());
}

#[test]
fn engine_failure_stops_before_any_evaluation() {
    let dir = tempfile::tempdir().unwrap();
    let resume = dir.path().join("cv.pdf");
    std::fs::write(&resume, b"%PDF-1.4 resume").unwrap();
    let missing_lib = dir.path().join("libpdfium-missing.so");

    let output = run(&[
        "review",
        "--resume",
        resume.to_str().unwrap(),
        "--job",
        "x",
        "--pdfium-lib",
        missing_lib.to_str().unwrap(),
    ]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(1), "stderr: {stderr}");
    assert!(stderr.contains("Failed to locate the PDFium engine"), "stderr: {stderr}");
    assert!(!stderr.contains("Evaluating"), "stderr: {stderr}");
    assert!(output.stdout.is_empty());
}
