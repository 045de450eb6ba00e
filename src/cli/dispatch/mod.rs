use crate::{
    check::{Config, DEFAULT_SIZE, DEFAULT_TIMEOUT, DEFAULT_URL},
    cli::actions::Action,
    size::ByteSize,
    tls::TlsConfig,
};
use anyhow::Result;
use clap::ArgMatches;
use std::{path::PathBuf, time::Duration};

/// Extract TLS configuration from the credential flags
fn extract_tls_config(matches: &ArgMatches) -> TlsConfig {
    let path = |id: &str| {
        matches
            .get_one::<String>(id)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
    };

    TlsConfig {
        cert: path("cert-file"),
        key: path("key-file"),
        ca: path("trusted-ca-file"),
    }
}

/// Convert `ArgMatches` into typed Action enum with validation
///
/// # Errors
///
/// Returns an error if no usable endpoint is given
pub fn dispatch(matches: &ArgMatches) -> Result<Action> {
    let urls: Vec<String> = matches
        .get_many::<String>("url")
        .map(|urls| {
            urls.map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty())
                .collect()
        })
        .unwrap_or_else(|| vec![DEFAULT_URL.to_string()]);

    if urls.is_empty() {
        anyhow::bail!("at least one etcd url is required");
    }

    let size = matches
        .get_one::<ByteSize>("size")
        .copied()
        .unwrap_or(DEFAULT_SIZE);

    let timeout = matches
        .get_one::<u64>("timeout")
        .copied()
        .map_or(DEFAULT_TIMEOUT, Duration::from_secs);

    let scheme = matches
        .get_one::<String>("scheme")
        .filter(|s| !s.is_empty())
        .cloned();

    let textfile = matches.get_one::<String>("textfile").map(PathBuf::from);

    Ok(Action::Check {
        config: Config {
            urls,
            size,
            tls: extract_tls_config(matches),
            timeout,
            scheme,
            metrics: matches.get_flag("metrics"),
            textfile,
        },
    })
}
