#![allow(dead_code, deprecated, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use assert_cmd::cargo::CommandCargoExt;
use std::{
    path::{Path, PathBuf},
    process::Command,
};

/// Nothing listens on port 1, connections are refused right away
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1";

const ENV_VARS: [&str; 10] = [
    "CHECK_ETCD_URL",
    "CHECK_ETCD_SIZE",
    "CHECK_ETCD_CERT_FILE",
    "CHECK_ETCD_KEY_FILE",
    "CHECK_ETCD_TRUSTED_CA_FILE",
    "CHECK_ETCD_TIMEOUT",
    "CHECK_ETCD_SCHEME",
    "CHECK_ETCD_METRICS",
    "CHECK_ETCD_TEXTFILE",
    "RUST_LOG",
];

/// The binary under test, isolated from any `CHECK_ETCD_*` settings of the caller
pub fn check_etcd() -> Command {
    let mut cmd = Command::cargo_bin("check-etcd").unwrap();
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

/// PEM fixtures: a CA and a client certificate signed by it, valid until 2126
pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}
