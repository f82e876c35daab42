//! End-to-end tests through `run_app_with_output` and the compiled binary.

use clap::Parser;
use dupescan::cli::Cli;
use dupescan::error::ExitCode;
use dupescan::scanner::{HashAlgorithm, Hasher};
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn run(args: &[&str]) -> (anyhow::Result<ExitCode>, String) {
    let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
    let mut out = Vec::new();
    let result = dupescan::run_app_with_output(cli, &mut out);
    (result, String::from_utf8(out).unwrap())
}

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_dupescan"))
}

fn scenario_a(root: &Path) {
    fs::write(root.join("a.txt"), b"hello").unwrap();
    fs::write(root.join("b.txt"), b"hello").unwrap();
    fs::write(root.join("c.txt"), b"world!").unwrap();
}

#[test]
fn test_text_report_with_duplicates() {
    let dir = tempdir().unwrap();
    scenario_a(dir.path());
    let root = dir.path().to_str().unwrap();

    let (result, out) = run(&["dupescan", "--no-progress", root]);

    assert_eq!(result.unwrap(), ExitCode::Success);
    let digest = Hasher::default().hash_bytes(b"hello");
    let expected_head = format!(
        "Duplicate files found:\n\nHash: {digest}\n  {}\n  {}\n",
        dir.path().join("a.txt").display(),
        dir.path().join("b.txt").display()
    );
    assert!(out.starts_with(&expected_head), "unexpected report:\n{out}");
    assert!(!out.contains("c.txt"));
    assert!(out.contains("\nFiles scanned: 3\n"));
    assert!(out.contains("\nTotal files size sum: 0 MB 0 KB\n"));
    assert!(out.contains("\nTime taken: "));
    assert!(out.contains("\nDuplicate groups: 1\n"));
}

#[test]
fn test_text_report_all_unique() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("only.txt"), b"hello").unwrap();

    let (result, out) = run(&["dupescan", "--no-progress", dir.path().to_str().unwrap()]);

    assert_eq!(result.unwrap(), ExitCode::Success);
    assert!(out.starts_with("All files are unique\n"));
    assert!(out.contains("Files scanned: 1"));
    assert!(out.contains("Duplicate groups: 0"));
}

#[test]
fn test_file_root_prints_unique_report() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("only.txt");
    fs::write(&file, b"hello").unwrap();

    let (result, out) = run(&["dupescan", "--no-progress", file.to_str().unwrap()]);

    assert_eq!(result.unwrap(), ExitCode::Success);
    assert!(out.starts_with("All files are unique\n"));
    assert!(out.contains("Files scanned: 1"));
}

#[test]
fn test_total_size_line() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("big.bin"), vec![1u8; 1024 * 1024 + 3 * 1024]).unwrap();

    let (_, out) = run(&["dupescan", "-q", dir.path().to_str().unwrap()]);

    assert!(out.contains("Total files size sum: 1 MB 3 KB"));
}

#[test]
fn test_json_report() {
    let dir = tempdir().unwrap();
    scenario_a(dir.path());

    let (result, out) = run(&[
        "dupescan",
        "--output",
        "json",
        "--algorithm",
        "sha256",
        dir.path().to_str().unwrap(),
    ]);

    assert_eq!(result.unwrap(), ExitCode::Success);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(
        value["duplicates"][0]["hash"],
        Hasher::new(HashAlgorithm::Sha256).hash_bytes(b"hello")
    );
    assert_eq!(value["duplicates"][0]["files"].as_array().unwrap().len(), 2);
    assert_eq!(value["all_unique"], false);
    assert_eq!(value["summary"]["files_scanned"], 3);
    assert_eq!(value["summary"]["total_size"], 16);
    assert_eq!(value["summary"]["algorithm"], "sha256");
}

#[test]
fn test_json_report_all_unique() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("only.txt"), b"hello").unwrap();

    let (result, out) = run(&["dupescan", "-o", "json", dir.path().to_str().unwrap()]);

    assert_eq!(result.unwrap(), ExitCode::Success);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["all_unique"], true);
    assert!(value["duplicates"].as_array().unwrap().is_empty());
    assert_eq!(value["summary"]["duplicate_groups"], 0);
}

#[test]
fn test_missing_root_prints_nothing() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("gone");

    let (result, out) = run(&["dupescan", "--no-progress", missing.to_str().unwrap()]);

    let err = result.unwrap_err();
    assert!(err.to_string().contains("gone"));
    assert!(out.is_empty());
}

#[test]
fn test_invalid_exclude_pattern_is_error() {
    let dir = tempdir().unwrap();

    let (result, out) = run(&["dupescan", "-e", "[", dir.path().to_str().unwrap()]);

    assert!(result.is_err());
    assert!(out.is_empty());
}

#[test]
fn test_binary_scenario_a() {
    let dir = tempdir().unwrap();
    scenario_a(dir.path());

    let output = binary()
        .arg("--no-progress")
        .arg(dir.path())
        .env_remove("RUST_LOG")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Duplicate files found:"));
    assert!(stdout.contains("Duplicate groups: 1"));
}

#[test]
fn test_binary_defaults_to_current_directory() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("x.txt"), b"one").unwrap();

    let output = binary()
        .arg("--no-progress")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Files scanned: 1"));
}

#[test]
fn test_binary_missing_root_exits_one() {
    let dir = tempdir().unwrap();

    let output = binary()
        .arg(dir.path().join("nope"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

#[test]
fn test_binary_two_paths_is_usage_error() {
    let output = binary().args(["/a", "/b"]).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(!output.stderr.is_empty());
}

#[test]
fn test_binary_help_exits_zero() {
    let output = binary().arg("--help").output().unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--max-concurrency"));
    assert!(stdout.contains("--exclude"));
}

#[test]
fn test_binary_version_exits_zero() {
    let output = binary().arg("--version").output().unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}
