//! Runs the `relpack` binary itself and checks exit status and output.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn fake_binary(dir: &Path, output: &str) -> PathBuf {
    let path = dir.join("fake-bin");
    fs::write(&path, format!("#!/bin/sh\necho '{}'\n", output)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn relpack(dir: &Path, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_relpack"));
    for var in ["ENABLE_LINT", "TARGET", "BIN_NAME", "RELEASE_DIR", "CARGO_FLAGS", "DEPS"] {
        cmd.env_remove(var);
    }
    cmd.current_dir(dir).args(args).output().unwrap()
}

#[test]
fn lint_flag_does_not_swallow_subcommand() {
    let dir = tempfile::tempdir().unwrap();
    let bin = fake_binary(dir.path(), "tool 1.2.3");
    let bin = bin.to_str().unwrap();

    for flag in ["--lint", "--no-lint"] {
        let out = relpack(dir.path(), &["--bin", "tool", flag, "version", "--binary", bin]);
        assert!(out.status.success(), "{flag}: {}", String::from_utf8_lossy(&out.stderr));
        assert_eq!(String::from_utf8_lossy(&out.stdout), "1.2.3\n");
    }
}

#[test]
fn lint_and_no_lint_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let out = relpack(dir.path(), &["--lint", "--no-lint", "version"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn version_works_outside_cargo_project() {
    let dir = tempfile::tempdir().unwrap();
    let bin = fake_binary(dir.path(), "tool v0.9.0");

    let out = relpack(dir.path(), &["version", "--binary", bin.to_str().unwrap()]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(String::from_utf8_lossy(&out.stdout), "v0.9.0\n");
}

#[test]
fn failed_package_exits_one_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let bin = fake_binary(dir.path(), "tool");

    let out = relpack(
        dir.path(),
        &["--bin", "tool", "package", "--binary", bin.to_str().unwrap()],
    );
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Error:"), "{stderr}");
    assert!(stderr.contains("extract-version"), "{stderr}");

    let release_dir = dir.path().join("release");
    assert!(!release_dir.exists() || fs::read_dir(&release_dir).unwrap().next().is_none());
}

#[test]
fn successful_package_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let bin = fake_binary(dir.path(), "tool 1.0.0");

    let out = relpack(
        dir.path(),
        &[
            "--bin",
            "tool",
            "--target",
            "x86_64-unknown-linux-gnu",
            "package",
            "--binary",
            bin.to_str().unwrap(),
        ],
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let release_dir = dir.path().join("release");
    assert_eq!(
        fs::read_to_string(release_dir.join("archive_name")).unwrap(),
        "tool-1.0.0-x86_64-unknown-linux-gnu.tar.gz"
    );
    assert_eq!(fs::read_to_string(release_dir.join("version")).unwrap(), "1.0.0");
}
