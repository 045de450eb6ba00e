use anyhow::{Context, Result};
use prometheus::{Encoder, IntGaugeVec, Registry, opts, register_int_gauge_vec_with_registry};
use std::{ffi::OsString, path::Path, sync::LazyLock};
use tokio::fs;
use tracing::{debug, warn};

/// Name of the metric emitted on stdout with `--metrics`
pub const DB_SIZE_METRIC: &str = "etcd_db_size_bytes";

pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

trait ResultExt<T> {
    fn or_exit(self, context: &str) -> T;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn or_exit(self, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                eprintln!("failed to initialize metric ({context}): {err}");
                std::process::exit(2);
            }
        }
    }
}

pub static DB_SIZE_BYTES: LazyLock<IntGaugeVec> = LazyLock::new(|| {
    register_int_gauge_vec_with_registry!(
        opts!(DB_SIZE_METRIC, "Database size reported by the etcd member in bytes"),
        &["scheme"],
        &REGISTRY
    )
    .or_exit("metric can be created")
});

pub static DB_SIZE_LIMIT_BYTES: LazyLock<IntGaugeVec> = LazyLock::new(|| {
    register_int_gauge_vec_with_registry!(
        opts!(
            "etcd_db_size_limit_bytes",
            "Configured database size threshold in bytes"
        ),
        &["scheme"],
        &REGISTRY
    )
    .or_exit("metric can be created")
});

pub static CHECK_STATUS: LazyLock<IntGaugeVec> = LazyLock::new(|| {
    register_int_gauge_vec_with_registry!(
        opts!("etcd_size_check_status", "0 ok, 2 critical"),
        &["scheme"],
        &REGISTRY
    )
    .or_exit("metric can be created")
});

/// Resolve the label used for metric output.
///
/// An explicit scheme always wins. Otherwise the hostname is used; if it cannot
/// be resolved the label is left empty so the metric is still emitted.
#[must_use]
pub fn scheme_label<F>(scheme: Option<&str>, hostname: F) -> String
where
    F: FnOnce() -> nix::Result<OsString>,
{
    if let Some(scheme) = scheme {
        return scheme.to_string();
    }

    match hostname() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(e) => {
            warn!("could not resolve hostname for metric label: {e}");
            String::new()
        }
    }
}

/// Label value escaping as required by the Prometheus text format
fn escape_label_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Format a single metric sample: `name{scheme="..."} value timestamp`
#[must_use]
pub fn metric_line(name: &str, scheme: &str, value: i64, timestamp: i64) -> String {
    format!(
        "{name}{{scheme=\"{}\"}} {value} {timestamp}",
        escape_label_value(scheme)
    )
}

/// Encode and return metrics in the Prometheus text format
///
/// # Errors
///
/// Returns an error if metrics encoding fails
pub fn encode_metrics() -> Result<Vec<u8>, String> {
    let mut buffer = Vec::new();
    let encoder = prometheus::TextEncoder::new();

    encoder
        .encode(&REGISTRY.gather(), &mut buffer)
        .map_err(|e| format!("could not encode custom metrics: {e}"))?;

    Ok(buffer)
}

/// Write the encoded registry for a node-exporter textfile collector.
///
/// The file is written next to its destination and renamed into place, so
/// the collector never reads a partial file.
///
/// # Errors
///
/// Returns an error if encoding, writing or renaming fails
pub async fn write_textfile(path: &Path) -> Result<()> {
    let buffer = encode_metrics().map_err(anyhow::Error::msg)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(format!(".{}.tmp", std::process::id()));
    let tmp = Path::new(&tmp);

    fs::write(tmp, &buffer)
        .await
        .with_context(|| format!("failed to write {}", tmp.display()))?;

    if let Err(e) = fs::rename(tmp, path).await {
        let _ = fs::remove_file(tmp).await;
        return Err(e).with_context(|| format!("failed to rename into {}", path.display()));
    }

    debug!("metrics written to {}", path.display());

    Ok(())
}
