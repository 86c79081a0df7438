//! Kestrel Federated Log Query Core
//!
//! This crate answers tenant-scoped log queries against one or more
//! Elasticsearch clusters of mixed major versions and presents the result as
//! if it came from a single cluster.
//!
//! # Architecture
//!
//! - [`types`] - Request and result types
//! - [`error`] - Error types for all operations
//! - [`core`] - The [`SearchBackend`] trait
//! - [`backends`] - Cluster connections with version detection
//! - [`query`] - Translation of requests into search bodies
//! - [`federation`] - Fan-out, partial failure tolerance and merge
//! - [`catalog`] - Background index discovery and index lookup
//! - [`pagination`] - Server-held pagination sessions
//! - [`service`] - The log search operations built from all of the above
//! - [`observability`] - Optional measurement sink
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use kestrel_gateway::backends::elasticsearch::{ClusterConfig, connect_all};
//! use kestrel_gateway::catalog::{CatalogConfig, IndexCatalog};
//! use kestrel_gateway::federation::FederationCoordinator;
//! use kestrel_gateway::pagination::SessionStore;
//! use kestrel_gateway::query::{AdapterConfig, QueryAdapter};
//! use kestrel_gateway::service::{LogSearchService, ServiceConfig};
//! use kestrel_gateway::types::{LogQueryRequest, SearchRequestSpec};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let clusters = ClusterConfig {
//!     hosts: vec!["http://es-a:9200".into(), "http://es-b:9200".into()],
//!     ..Default::default()
//! };
//! let backends = connect_all(&clusters)?;
//!
//! let catalog = Arc::new(IndexCatalog::new(
//!     backends.clone(),
//!     CatalogConfig::default(),
//!     kestrel_gateway::observability::noop(),
//! )?);
//! catalog.startup();
//!
//! let adapter = QueryAdapter::new(AdapterConfig::default());
//! let coordinator = FederationCoordinator::new(backends, adapter.timestamp_field());
//! let service = LogSearchService::new(
//!     adapter,
//!     catalog.clone(),
//!     coordinator,
//!     SessionStore::default(),
//!     ServiceConfig::default(),
//! );
//!
//! let page = service
//!     .query(&LogQueryRequest::new(SearchRequestSpec::new("acme").with_page(1, 20)))
//!     .await?;
//! println!("{} matching documents", page.total);
//!
//! catalog.shutdown().await;
//! # Ok(())
//! # }
//! ```
//!
//! # Partial results
//!
//! A cluster that fails is dropped from the result and named in its
//! `unavailable` list. Only when every cluster fails does an operation return
//! [`FederationError::AllBackendsUnavailable`].

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod catalog;
pub mod core;
pub mod error;
pub mod federation;
pub mod observability;
pub mod pagination;
pub mod query;
pub mod service;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{
    BackendError, BackendResult, CatalogError, ConfigError, FederationError, GatewayError,
    GatewayResult, QueryError, SessionError,
};
pub use types::{
    AggregatedResult, CursorToken, IndexTarget, LogQueryRequest, MergedResult, SearchRequestSpec,
    StatsRequest,
};

// Re-export core traits and components
pub use catalog::IndexCatalog;
pub use core::{DynBackend, SearchBackend};
pub use federation::FederationCoordinator;
pub use pagination::SessionStore;
pub use query::QueryAdapter;
pub use service::LogSearchService;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
