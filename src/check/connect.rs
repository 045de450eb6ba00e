use super::{CheckError, DbStatus};
use crate::tls::{TlsConfig, load_credentials};
use etcd_client::{Client, ConnectOptions};
use std::{error::Error as _, time::Duration};
use tonic::{Code, ConnectError};
use tracing::{debug, info};

/// Make an endpoint usable by the client: add a missing scheme and switch
/// `http://` to `https://` when TLS is configured.
#[must_use]
pub fn normalize_endpoint(url: &str, tls: bool) -> String {
    let url = url.trim().trim_end_matches('/');

    match (url.split_once("://"), tls) {
        (Some(("http", rest)), true) => format!("https://{rest}"),
        (Some(_), _) => url.to_string(),
        (None, true) => format!("https://{url}"),
        (None, false) => format!("http://{url}"),
    }
}

/// Client session pinned to a single etcd member.
///
/// The underlying channel is closed when the session is dropped, which covers
/// every return path of the check.
pub struct Session {
    client: Client,
    endpoint: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Connect to the first of `urls`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Credentials`] if TLS material cannot be loaded and
    /// [`CheckError::Connect`] if the client cannot be built.
    pub async fn open(
        urls: &[String],
        timeout: Duration,
        tls: &TlsConfig,
    ) -> Result<Self, CheckError> {
        let first = urls.first().ok_or(CheckError::NoEndpoint)?;
        let endpoint = normalize_endpoint(first, tls.is_enabled());

        if let Some(ignored) = urls.get(1..).filter(|rest| !rest.is_empty()) {
            debug!("only {endpoint} is checked, ignoring {}", ignored.join(", "));
        }

        let mut options = ConnectOptions::new()
            .with_connect_timeout(timeout)
            .with_timeout(timeout);

        if let Some(credentials) = load_credentials(tls)
            .await
            .map_err(CheckError::Credentials)?
        {
            options = options.with_tls(credentials.into_tls_options());
        }

        let client = Client::connect([endpoint.as_str()], Some(options))
            .await
            .map_err(CheckError::Connect)?;

        Ok(Self { client, endpoint })
    }

    /// Issue a single maintenance status request.
    ///
    /// # Errors
    ///
    /// The channel dials on first use, so a member that cannot be reached
    /// surfaces here and is reported as [`CheckError::Connect`].
    /// [`CheckError::Status`] is returned if the member answers with an error
    /// and [`CheckError::StatusTimeout`] if it does not answer within `timeout`.
    pub async fn status(&mut self, timeout: Duration) -> Result<DbStatus, CheckError> {
        let response = tokio::time::timeout(timeout, self.client.status())
            .await
            .map_err(|_| CheckError::StatusTimeout(timeout))?
            .map_err(|e| {
                if is_connect_failure(&e) {
                    CheckError::Connect(e)
                } else {
                    CheckError::Status(e)
                }
            })?;

        info!("connected to {}", self.endpoint);

        let status = DbStatus {
            db_size: response.db_size(),
            version: response.version().to_string(),
            leader: response.leader(),
            member_id: response.header().map(|h| h.member_id()),
        };

        debug!(
            "status from {} (member {:x}): version {}, db size {}, leader {:x}",
            self.endpoint,
            status.member_id.unwrap_or_default(),
            status.version,
            status.db_size,
            status.leader
        );

        Ok(status)
    }
}

/// Whether the error means the member was never reached: refused or timed
/// out dial, DNS failure or TLS handshake failure.
fn is_connect_failure(err: &etcd_client::Error) -> bool {
    match err {
        etcd_client::Error::TransportError(_) | etcd_client::Error::IoError(_) => true,
        etcd_client::Error::GRpcStatus(status) if status.code() == Code::Unavailable => {
            let mut source = status.source();
            while let Some(err) = source {
                if err.is::<ConnectError>() {
                    return true;
                }
                source = err.source();
            }
            false
        }
        _ => false,
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        debug!("closing etcd session to {}", self.endpoint);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn test_normalize_endpoint_plain() {
        assert_eq!(
            normalize_endpoint("http://127.0.0.1:2379", false),
            "http://127.0.0.1:2379"
        );
        assert_eq!(
            normalize_endpoint("127.0.0.1:2379", false),
            "http://127.0.0.1:2379"
        );
    }

    #[test]
    fn test_normalize_endpoint_tls() {
        assert_eq!(
            normalize_endpoint("http://etcd-0:2379", true),
            "https://etcd-0:2379"
        );
        assert_eq!(
            normalize_endpoint("https://etcd-0:2379", true),
            "https://etcd-0:2379"
        );
        assert_eq!(normalize_endpoint("etcd-0:2379", true), "https://etcd-0:2379");
    }

    #[test]
    fn test_normalize_endpoint_https_without_tls_kept() {
        assert_eq!(
            normalize_endpoint("https://etcd-0:2379", false),
            "https://etcd-0:2379"
        );
    }

    #[test]
    fn test_normalize_endpoint_trims() {
        assert_eq!(
            normalize_endpoint(" http://etcd-0:2379/ ", false),
            "http://etcd-0:2379"
        );
    }

    fn refused() -> tonic::Status {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        tonic::Status::from_error(Box::new(ConnectError(Box::new(io))))
    }

    #[test]
    fn test_refused_dial_is_connect_failure() {
        let status = refused();
        assert_eq!(status.code(), Code::Unavailable);
        assert!(is_connect_failure(&etcd_client::Error::GRpcStatus(status)));
    }

    #[test]
    fn test_server_unavailable_is_not_connect_failure() {
        let status = tonic::Status::unavailable("etcdserver: leader changed");
        assert!(!is_connect_failure(&etcd_client::Error::GRpcStatus(status)));
    }

    #[test]
    fn test_rpc_errors_are_not_connect_failures() {
        let status = tonic::Status::permission_denied("etcdserver: permission denied");
        assert!(!is_connect_failure(&etcd_client::Error::GRpcStatus(status)));
        assert!(!is_connect_failure(&etcd_client::Error::InvalidArgs("bad".to_string())));
    }

    #[test]
    fn test_io_error_is_connect_failure() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "dial timed out");
        assert!(is_connect_failure(&etcd_client::Error::IoError(io)));
    }

    #[tokio::test]
    async fn test_status_refused_is_could_not_connect() {
        let mut session = Session::open(
            &["http://127.0.0.1:1".to_string()],
            Duration::from_secs(1),
            &TlsConfig::default(),
        )
        .await
        .unwrap();

        let err = session.status(Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, CheckError::Connect(_)), "{err}");
        assert!(err.to_string().starts_with("could not connect"));
    }

    #[tokio::test]
    async fn test_open_without_endpoints() {
        let err = Session::open(&[], Duration::from_secs(1), &TlsConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckError::NoEndpoint));
        assert!(err.to_string().starts_with("could not connect"));
    }

    #[tokio::test]
    async fn test_open_with_broken_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let ca = dir.path().join("ca.crt");
        std::fs::write(&ca, "not a certificate").unwrap();

        let tls = TlsConfig {
            ca: Some(ca),
            ..Default::default()
        };
        let err = Session::open(
            &["http://127.0.0.1:2379".to_string()],
            Duration::from_secs(1),
            &tls,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CheckError::Credentials(_)));
        assert!(err.to_string().contains("no certificates found"));
    }
}
