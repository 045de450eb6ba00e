use std::path::PathBuf;

/// TLS material used to reach etcd.
///
/// TLS is on as soon as any of the files is configured. A client identity
/// needs both `cert` and `key`; `ca` alone only verifies the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsConfig {
    pub cert: Option<PathBuf>,
    pub key: Option<PathBuf>,
    pub ca: Option<PathBuf>,
}

impl TlsConfig {
    /// Check if TLS is enabled
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.cert.is_some() || self.key.is_some() || self.ca.is_some()
    }

    /// Check if a client certificate/key pair is configured
    #[must_use]
    pub const fn has_identity(&self) -> bool {
        self.cert.is_some() && self.key.is_some()
    }
}
