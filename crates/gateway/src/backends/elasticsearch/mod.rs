//! Elasticsearch-compatible cluster connections.
//!
//! One [`ClusterConnection`] owns one [`ClusterEndpoint`]. It probes the
//! server version once, picks typed or type-free paths accordingly, and
//! implements [`SearchBackend`](crate::core::SearchBackend) for the federation
//! coordinator and the index catalog.
//!
//! # Example
//!
//! ```ignore
//! use kestrel_gateway::backends::elasticsearch::{ClusterConnection, ClusterEndpoint};
//!
//! let endpoint = ClusterEndpoint::from_url("http://localhost:9200/")?
//!     .with_credentials("elastic", "changeme")
//!     .with_verify_tls(false);
//! let connection = ClusterConnection::new(endpoint);
//!
//! let version = connection.detect_version().await;
//! let names = connection.fetch_catalog().await?;
//! ```

mod config;
mod connection;
mod version;

use std::sync::Arc;
use std::time::Duration;

pub use config::{ClusterConfig, ClusterEndpoint, DEFAULT_REQUEST_TIMEOUT_MS};
pub use connection::ClusterConnection;
pub use version::{DEFAULT_VERSION_NUMBER, DetectedVersion, FALLBACK_MAJOR, LEGACY_MAX_MAJOR};

use crate::core::DynBackend;
use crate::error::GatewayResult;

/// Builds one connection per configured host.
///
/// No network traffic happens here; transports are created on first use.
pub fn connect_all(config: &ClusterConfig) -> GatewayResult<Vec<DynBackend>> {
    let timeout = Duration::from_millis(config.request_timeout_ms);
    Ok(config
        .endpoints()?
        .into_iter()
        .map(|endpoint| Arc::new(ClusterConnection::with_timeout(endpoint, timeout)) as DynBackend)
        .collect())
}
