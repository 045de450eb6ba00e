//! TLS material for etcd connections
//!
//! - `config` - which certificate, key and CA files are configured
//! - `loader` - reads and checks the PEM files and builds client TLS options

pub mod config;
pub mod loader;

pub use config::TlsConfig;
pub use loader::{Credentials, ensure_crypto_provider, load_credentials};
