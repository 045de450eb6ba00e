use super::CheckError;
use crate::tls::TlsConfig;
use std::{io::ErrorKind, path::Path};
use tracing::debug;

fn ensure_exists(kind: &'static str, path: Option<&Path>) -> Result<(), CheckError> {
    let Some(path) = path else {
        return Ok(());
    };

    match std::fs::metadata(path) {
        Err(source) if source.kind() == ErrorKind::NotFound => Err(CheckError::MissingFile {
            kind,
            path: path.to_path_buf(),
            source,
        }),
        // anything else (permissions, ...) is reported when the file is read
        _ => Ok(()),
    }
}

/// Verify that every configured TLS file exists, in the order cert, key, CA.
///
/// Nothing is checked when TLS is not configured.
///
/// # Errors
///
/// Returns [`CheckError::MissingFile`] for the first file that does not exist
pub fn check_args(tls: &TlsConfig) -> Result<(), CheckError> {
    if !tls.is_enabled() {
        debug!("TLS not configured, skipping credential checks");
        return Ok(());
    }

    ensure_exists("certificate", tls.cert.as_deref())?;
    ensure_exists("certificate key", tls.key.as_deref())?;
    ensure_exists("CA", tls.ca.as_deref())?;

    Ok(())
}
