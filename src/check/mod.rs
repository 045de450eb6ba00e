//! etcd database size check
//!
//! A run validates the TLS files, opens a session to the first endpoint,
//! asks for the member status and compares the reported database size with
//! the configured threshold. Every failure is reported as `CRITICAL`.

pub mod connect;
pub mod validate;

use crate::{
    metrics::{
        CHECK_STATUS, DB_SIZE_BYTES, DB_SIZE_LIMIT_BYTES, DB_SIZE_METRIC, metric_line,
        scheme_label, write_textfile,
    },
    size::ByteSize,
    tls::TlsConfig,
};
use chrono::Utc;
use connect::Session;
use std::{io::Write, path::PathBuf, process::ExitCode, time::Duration};
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_URL: &str = "http://127.0.0.1:2379";
/// Alarm at 1.5G, the default etcd quota is 2G
pub const DEFAULT_SIZE: ByteSize = ByteSize::new(1_500_000_000);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Monitoring states, using the Sensu/Nagios exit code convention
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Ok = 0,
    Warning = 1,
    Critical = 2,
    Unknown = 3,
}

impl CheckState {
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl From<CheckState> for ExitCode {
    fn from(state: CheckState) -> Self {
        Self::from(state.code())
    }
}

/// Result of one check run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub state: CheckState,
    pub message: String,
}

impl CheckOutcome {
    #[must_use]
    pub const fn ok(message: String) -> Self {
        Self {
            state: CheckState::Ok,
            message,
        }
    }

    #[must_use]
    pub const fn critical(message: String) -> Self {
        Self {
            state: CheckState::Critical,
            message,
        }
    }
}

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("could not load {kind}({}): {source}", .path.display())]
    MissingFile {
        kind: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not load TLS credentials: {0:#}")]
    Credentials(anyhow::Error),

    #[error("could not connect: no endpoint configured")]
    NoEndpoint,

    #[error("could not connect: {0}")]
    Connect(etcd_client::Error),

    #[error("failed to get status: {0}")]
    Status(etcd_client::Error),

    #[error("failed to get status: no answer within {}s", .0.as_secs())]
    StatusTimeout(Duration),
}

impl From<CheckError> for CheckOutcome {
    fn from(err: CheckError) -> Self {
        Self::critical(err.to_string())
    }
}

/// Status of one member at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbStatus {
    pub db_size: i64,
    pub version: String,
    pub leader: u64,
    pub member_id: Option<u64>,
}

/// Check configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub urls: Vec<String>,
    pub size: ByteSize,
    pub tls: TlsConfig,
    pub timeout: Duration,
    /// Label for metric output, defaults to the hostname
    pub scheme: Option<String>,
    /// Print a metric line before the threshold decision
    pub metrics: bool,
    /// Write a Prometheus textfile after the run
    pub textfile: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            urls: vec![DEFAULT_URL.to_string()],
            size: DEFAULT_SIZE,
            tls: TlsConfig::default(),
            timeout: DEFAULT_TIMEOUT,
            scheme: None,
            metrics: false,
            textfile: None,
        }
    }
}

impl Config {
    fn wants_label(&self) -> bool {
        self.metrics || self.textfile.is_some()
    }
}

/// Compare a reported size with the threshold
#[must_use]
pub fn evaluate(db_size: i64, threshold: ByteSize) -> CheckOutcome {
    let size = u64::try_from(db_size).unwrap_or(0);

    if size > threshold.bytes() {
        CheckOutcome::critical(format!(
            "Database exceeding set limit ({threshold}): {size}"
        ))
    } else {
        CheckOutcome::ok(format!("Database is within limit ({threshold}): {size}"))
    }
}

/// Run the check once
///
/// Never fails: every error is turned into a `CRITICAL` outcome.
pub async fn run(config: &Config) -> CheckOutcome {
    let label = config
        .wants_label()
        .then(|| scheme_label(config.scheme.as_deref(), nix::unistd::gethostname));

    let outcome = match execute(config, label.as_deref()).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!("{e}");
            e.into()
        }
    };

    if let (Some(label), Some(path)) = (label.as_deref(), config.textfile.as_deref()) {
        DB_SIZE_LIMIT_BYTES
            .with_label_values(&[label])
            .set(i64::try_from(config.size.bytes()).unwrap_or(i64::MAX));
        CHECK_STATUS
            .with_label_values(&[label])
            .set(i64::from(outcome.state.code()));

        if let Err(e) = write_textfile(path).await {
            warn!("could not write metrics textfile: {e:#}");
        }
    }

    outcome
}

async fn execute(config: &Config, label: Option<&str>) -> Result<CheckOutcome, CheckError> {
    validate::check_args(&config.tls)?;

    let status = {
        let mut session = Session::open(&config.urls, config.timeout, &config.tls).await?;
        session.status(config.timeout).await?
    };

    let outcome = report(
        &status,
        config,
        label,
        Utc::now().timestamp(),
        &mut std::io::stdout().lock(),
    );
    info!("{:?}: {}", outcome.state, outcome.message);

    Ok(outcome)
}

/// Record a status and decide the outcome.
///
/// With `metrics` on, the metric line is written to `out` before the
/// threshold is evaluated, whatever the outcome turns out to be.
pub fn report<W: Write>(
    status: &DbStatus,
    config: &Config,
    label: Option<&str>,
    timestamp: i64,
    out: &mut W,
) -> CheckOutcome {
    if let Some(label) = label {
        DB_SIZE_BYTES.with_label_values(&[label]).set(status.db_size);

        if config.metrics {
            let line = metric_line(DB_SIZE_METRIC, label, status.db_size, timestamp);
            if let Err(e) = writeln!(out, "{line}") {
                warn!("could not write metric line: {e}");
            }
        }
    }

    evaluate(status.db_size, config.size)
}
