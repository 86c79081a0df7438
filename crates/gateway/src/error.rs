//! Error types for the gateway core.
//!
//! Errors are layered the way the components are: a single cluster fails with
//! a [`BackendError`], the fan-out as a whole fails with a [`FederationError`],
//! pagination continuation fails with a [`SessionError`], and catalog
//! configuration fails with a [`CatalogError`]. [`GatewayError`] aggregates all
//! of them for callers that only want one type.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for gateway operations.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// A single cluster failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Every configured cluster failed.
    #[error(transparent)]
    Federation(#[from] FederationError),

    /// Pagination session lookup or page validation failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Index catalog configuration was rejected.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Component configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors originating from one cluster.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Network failure, timeout, or a non-2xx response.
    #[error("cluster unavailable: {cluster}: {message}")]
    Unavailable { cluster: String, message: String },

    /// The response arrived but could not be decoded.
    #[error("failed to decode response from {cluster}: {message}")]
    Decode { cluster: String, message: String },

    /// The configured endpoint could not be turned into a client.
    #[error("invalid cluster endpoint {url}: {message}")]
    InvalidEndpoint { url: String, message: String },
}

impl BackendError {
    /// Returns the cluster this error belongs to.
    pub fn cluster(&self) -> &str {
        match self {
            BackendError::Unavailable { cluster, .. } | BackendError::Decode { cluster, .. } => {
                cluster
            }
            BackendError::InvalidEndpoint { url, .. } => url,
        }
    }
}

/// Errors raised at the federation boundary.
#[derive(Error, Debug)]
pub enum FederationError {
    /// Every configured cluster failed for the query.
    #[error("all {attempted} configured clusters are unavailable")]
    AllBackendsUnavailable { attempted: usize },
}

/// Errors related to pagination sessions.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    /// The session never existed, belongs to another tenant, or has expired.
    #[error("pagination session expired or not found: {session_id}")]
    Expired { session_id: String },

    /// The requested page lies outside `1..=total_pages`.
    #[error("page {page} is out of range (1..={total_pages})")]
    InvalidPage { page: i64, total_pages: u64 },
}

/// Errors related to query inputs.
///
/// The query adapter never surfaces these; malformed inputs are treated as
/// absent. They exist for callers that want to validate a cursor up front.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueryError {
    /// The cursor token is not a valid encoded sort position.
    #[error("invalid pagination cursor: {cursor}")]
    InvalidCursor { cursor: String },
}

/// Errors related to index catalog configuration.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A configured include or exclude pattern is not a valid regex.
    #[error("invalid index pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Errors related to component configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No cluster endpoints were configured.
    #[error("at least one cluster endpoint is required")]
    NoClusters,

    /// A numeric setting is out of range.
    #[error("{setting} must be between {min} and {max}, got {value}")]
    OutOfRange {
        setting: String,
        min: u64,
        max: u64,
        value: u64,
    },
}

/// Result type alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Result type alias for single-cluster operations.
pub type BackendResult<T> = Result<T, BackendError>;
