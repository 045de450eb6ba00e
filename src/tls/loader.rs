use super::TlsConfig;
use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use etcd_client::{Certificate, Identity, TlsOptions};
use rustls::pki_types::CertificateDer;
use rustls_pemfile::{certs, private_key};
use std::{io::Cursor, path::Path, sync::OnceLock};
use tokio::fs;
use tracing::{debug, warn};
use x509_parser::prelude::{FromDer, X509Certificate};

static CRYPTO_PROVIDER_INIT: OnceLock<()> = OnceLock::new();

/// Ensure the rustls crypto provider is initialized
///
/// This should be called before any TLS operations. It's safe to call
/// multiple times as initialization only happens once.
pub fn ensure_crypto_provider() {
    CRYPTO_PROVIDER_INIT.get_or_init(|| {
        // another provider may already be installed by a dependency, that is fine
        if let Err(err) = rustls::crypto::ring::default_provider().install_default() {
            debug!("rustls crypto provider already installed: {err:?}");
        }
    });
}

/// PEM material read from disk and checked before it is handed to the client
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// Trusted CA bundle (PEM)
    pub ca: Option<Vec<u8>>,
    /// Client certificate chain (PEM)
    pub cert: Option<Vec<u8>>,
    /// Client private key (PEM)
    pub key: Option<Vec<u8>>,
    /// Days until the client certificate expires (negative if expired)
    pub cert_expiry_days: Option<i64>,
}

impl Credentials {
    /// Build the etcd client TLS options
    #[must_use]
    pub fn into_tls_options(self) -> TlsOptions {
        let mut options = TlsOptions::new();

        if let Some(ca) = self.ca {
            options = options.ca_certificate(Certificate::from_pem(ca));
        }

        if let (Some(cert), Some(key)) = (self.cert, self.key) {
            options = options.identity(Identity::from_pem(cert, key));
        }

        options
    }
}

/// Read and validate the configured TLS files.
///
/// Returns `None` when TLS is not configured.
///
/// # Errors
///
/// Returns an error if a file cannot be read, holds no certificate or key,
/// or the client certificate cannot be parsed.
pub async fn load_credentials(tls: &TlsConfig) -> Result<Option<Credentials>> {
    if !tls.is_enabled() {
        return Ok(None);
    }

    ensure_crypto_provider();

    let mut credentials = Credentials::default();

    if let Some(ca_path) = &tls.ca {
        let (pem, _) = load_cert_chain(ca_path).await?;
        debug!("loaded trusted CA from {}", ca_path.display());
        credentials.ca = Some(pem);
    }

    if let (Some(cert_path), Some(key_path)) = (&tls.cert, &tls.key) {
        let (pem, chain) = load_cert_chain(cert_path).await?;
        let key = load_private_key(key_path).await?;

        if let Some(leaf) = chain.first() {
            let days = calculate_expiry_days(leaf.as_ref())
                .with_context(|| format!("invalid certificate {}", cert_path.display()))?;
            if days < 0 {
                warn!(
                    "client certificate {} expired {} days ago",
                    cert_path.display(),
                    -days
                );
            } else {
                debug!(
                    "client certificate {} expires in {days} days",
                    cert_path.display()
                );
            }
            credentials.cert_expiry_days = Some(days);
        }

        credentials.cert = Some(pem);
        credentials.key = Some(key);
    }

    Ok(Some(credentials))
}

async fn load_cert_chain(path: &Path) -> Result<(Vec<u8>, Vec<CertificateDer<'static>>)> {
    let data = fs::read(path)
        .await
        .with_context(|| format!("failed to read certificate {}", path.display()))?;
    let parsed = parse_cert_chain(&data)?;

    if parsed.is_empty() {
        anyhow::bail!("no certificates found in {}", path.display());
    }

    Ok((data, parsed))
}

fn parse_cert_chain(data: &[u8]) -> Result<Vec<CertificateDer<'static>>> {
    let mut reader = Cursor::new(data);
    certs(&mut reader)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| anyhow!("invalid certificate PEM: {e}"))
}

async fn load_private_key(path: &Path) -> Result<Vec<u8>> {
    let data = fs::read(path)
        .await
        .with_context(|| format!("failed to read private key {}", path.display()))?;

    let mut reader = Cursor::new(data.as_slice());
    private_key(&mut reader)
        .map_err(|e| anyhow!("invalid private key PEM: {e}"))?
        .ok_or_else(|| anyhow!("no private key found in {}", path.display()))?;

    Ok(data)
}

fn calculate_expiry_days(cert_der: &[u8]) -> Result<i64> {
    let (_, cert) = X509Certificate::from_der(cert_der)
        .map_err(|e| anyhow!("failed to parse certificate: {e}"))?;
    let raw = cert.validity().not_after.to_datetime();
    let not_after = chrono::DateTime::<Utc>::from_timestamp(raw.unix_timestamp(), raw.nanosecond())
        .ok_or_else(|| anyhow!("invalid certificate expiry timestamp"))?;
    let remaining = not_after - Utc::now();
    Ok(remaining.num_days())
}
