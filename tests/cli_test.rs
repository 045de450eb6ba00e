//! Integration tests for the `check-etcd` binary
//!
//! None of these need a running etcd: they cover argument handling, the
//! credential checks that run before any network call, and failure paths
//! against an endpoint nobody listens on.

#![allow(deprecated, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo::CommandCargoExt;
use common::{UNREACHABLE_URL, check_etcd, fixture};
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_help() {
    Command::cargo_bin("check-etcd")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--trusted-ca-file"))
        .stdout(predicate::str::contains("--size"));
}

#[test]
fn test_version() {
    Command::cargo_bin("check-etcd")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_invalid_size_is_usage_error() {
    check_etcd()
        .args(["--size", "lots"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid size"));
}

#[test]
fn test_cert_without_key_is_usage_error() {
    check_etcd()
        .args(["--cert-file", "/tmp/client.crt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--key-file"));
}

#[test]
fn test_missing_cert_file_is_critical() {
    let dir = tempfile::tempdir().unwrap();
    let cert = dir.path().join("client.crt");

    check_etcd()
        .arg("--cert-file")
        .arg(&cert)
        .arg("--key-file")
        .arg(fixture("client.key"))
        .arg("--trusted-ca-file")
        .arg(fixture("ca.crt"))
        .args(["--url", UNREACHABLE_URL])
        .assert()
        .code(2)
        .stdout(predicate::str::starts_with("could not load certificate("))
        .stdout(predicate::str::contains("client.crt"));
}

#[test]
fn test_missing_key_file_is_critical() {
    let dir = tempfile::tempdir().unwrap();

    check_etcd()
        .arg("--cert-file")
        .arg(fixture("client.crt"))
        .arg("--key-file")
        .arg(dir.path().join("client.key"))
        .arg("--trusted-ca-file")
        .arg(fixture("ca.crt"))
        .assert()
        .code(2)
        .stdout(predicate::str::starts_with("could not load certificate key("));
}

#[test]
fn test_missing_ca_file_is_critical() {
    let dir = tempfile::tempdir().unwrap();

    check_etcd()
        .arg("--trusted-ca-file")
        .arg(dir.path().join("ca.crt"))
        .assert()
        .code(2)
        .stdout(predicate::str::starts_with("could not load CA("));
}

#[test]
fn test_invalid_ca_content_is_critical() {
    check_etcd()
        .arg("--trusted-ca-file")
        .arg(fixture("client.key"))
        .args(["--url", UNREACHABLE_URL])
        .assert()
        .code(2)
        .stdout(predicate::str::starts_with("could not load TLS credentials"));
}

#[test]
fn test_unreachable_endpoint_is_critical() {
    let assert = check_etcd()
        .args(["--url", UNREACHABLE_URL, "--timeout", "1"])
        .assert()
        .code(2);

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.starts_with("could not connect"), "unexpected output: {stdout}");
    assert_eq!(stdout.lines().count(), 1);
}

#[test]
fn test_unreachable_endpoint_prints_no_metric() {
    let assert = check_etcd()
        .args(["--url", UNREACHABLE_URL, "--timeout", "1", "--metrics", "-s", "test"])
        .assert()
        .code(2);

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(!stdout.contains("etcd_db_size_bytes"));
}

#[test]
fn test_textfile_written_on_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("etcd.prom");

    check_etcd()
        .args(["--url", UNREACHABLE_URL, "--timeout", "1", "-s", "it"])
        .arg("--textfile")
        .arg(&path)
        .assert()
        .code(2);

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("etcd_size_check_status{scheme=\"it\"} 2"));
}

#[test]
fn test_logs_go_to_stderr() {
    let assert = check_etcd()
        .args(["--url", UNREACHABLE_URL, "--timeout", "1", "-vv"])
        .assert()
        .code(2);

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(stdout.lines().count(), 1);
}
