//! # kestrel-rest - HTTP surface for the Kestrel log gateway
//!
//! This crate exposes the federated log search of [`kestrel_gateway`] as a
//! JSON API. Every response, success or failure, uses the same envelope:
//!
//! ```json
//! { "code": 0, "i18n_key": "info.query.ok", "data": { ... } }
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kestrel_gateway::backends::elasticsearch::connect_all;
//! use kestrel_gateway::observability;
//! use kestrel_rest::{ServerConfig, build_service, create_app};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::default();
//!     let backends = connect_all(&config.cluster_config())?;
//!     let service = build_service(&config, backends, observability::noop())?;
//!     service.catalog().startup();
//!
//!     let app = create_app(service, config.clone());
//!     let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
//!     axum::serve(listener, app).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## API Endpoints
//!
//! | Operation | HTTP Method | URL Pattern |
//! |-----------|-------------|-------------|
//! | query | POST | `/api/logs/query` |
//! | stats | POST | `/api/logs/stats` |
//! | open session | POST | `/api/logs/paginate/init` |
//! | session page | POST | `/api/logs/paginate/get` |
//! | list indices | GET | `/api/indices/list` |
//! | catalog config | POST | `/api/indices/config` |
//! | catalog refresh | POST | `/api/indices/refresh` |
//! | health | GET | `/healthz` (alias `/health`) |
//! | liveness | GET | `/_liveness` |
//!
//! ## Error Handling
//!
//! | HTTP Status | Code | Description |
//! |-------------|------|-------------|
//! | 400 | 3001 | Malformed body or invalid catalog configuration |
//! | 400 | 3002 | Missing or invalid parameter |
//! | 400 | 3004 | Page outside the session |
//! | 410 | 3003 | Session unknown, expired or owned by another tenant |
//! | 502 | 2001 | No cluster could answer |
//! | 500 | 9000 | Internal error |
//!
//! ## Architecture
//!
//! - [`error`] - Error types and their envelope mapping
//! - [`config`] - Server configuration
//! - [`state`] - Application state
//! - [`handlers`] - HTTP request handlers
//! - [`extractors`] - Body and header extraction
//! - [`responses`] - The response envelope and result codes
//! - [`routing`] - Route configuration

// Enforce documentation
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod responses;
pub mod routing;
pub mod state;

// Re-export commonly used types
pub use config::ServerConfig;
pub use error::{RestError, RestResult};
pub use responses::{Envelope, ResultCode};
pub use state::AppState;

use std::sync::Arc;

use axum::Router;
use kestrel_gateway::catalog::IndexCatalog;
use kestrel_gateway::core::DynBackend;
use kestrel_gateway::federation::FederationCoordinator;
use kestrel_gateway::observability::DynObserver;
use kestrel_gateway::pagination::SessionStore;
use kestrel_gateway::query::QueryAdapter;
use kestrel_gateway::service::LogSearchService;
use kestrel_gateway::GatewayResult;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Assembles the log search service from configuration and connected
/// clusters.
///
/// The catalog is created but not started; call
/// [`IndexCatalog::startup`] on `service.catalog()` to begin discovery.
pub fn build_service(
    config: &ServerConfig,
    backends: Vec<DynBackend>,
    observer: DynObserver,
) -> GatewayResult<Arc<LogSearchService>> {
    let catalog = Arc::new(IndexCatalog::new(
        backends.clone(),
        config.catalog_config(),
        observer.clone(),
    )?);

    let adapter = QueryAdapter::new(config.adapter_config());
    let coordinator = FederationCoordinator::new(backends, adapter.timestamp_field())
        .with_observer(observer)
        .with_debug_queries(config.debug_query_logs);

    Ok(Arc::new(LogSearchService::new(
        adapter,
        catalog,
        coordinator,
        SessionStore::new(config.session_config()),
        config.service_config(),
    )))
}

/// Creates the Axum application.
///
/// # Arguments
///
/// * `service` - The log search service
/// * `config` - Server configuration
pub fn create_app(service: Arc<LogSearchService>, config: ServerConfig) -> Router {
    info!(
        clusters = service.coordinator().cluster_names().len(),
        "Creating REST API server"
    );

    let state = AppState::new(service, config.clone());
    let router = routing::create_routes(state);

    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            std::time::Duration::from_secs(config.request_timeout),
        ));

    let router = if config.enable_cors {
        router.layer(build_cors_layer(&config))
    } else {
        router
    };

    router.layer(service_builder)
}

/// Builds the CORS layer based on configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let mut cors = CorsLayer::new();

    if config.cors_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    if config.cors_methods == "*" {
        cors = cors.allow_methods(Any);
    } else {
        let methods: Vec<_> = config
            .cors_methods
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_methods(methods);
    }

    if config.cors_headers == "*" {
        cors = cors.allow_headers(Any);
    } else {
        let headers: Vec<_> = config
            .cors_headers
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_headers(headers);
    }

    cors
}

/// Initializes the tracing subscriber for logging.
///
/// This should be called once at application startup. `RUST_LOG` overrides
/// `level` when set.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "kestrel={level},kestrel_rest={level},kestrel_gateway={level},tower_http=debug"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
