//! API route configuration.

use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::state::AppState;

/// Creates all API routes.
///
/// # Routes
///
/// ## Probes
/// - `GET /healthz` - Health check with catalog status
/// - `GET /health` - Alias of `/healthz`
/// - `GET /_liveness` - Bare liveness probe
///
/// ## Logs
/// - `POST /api/logs/query` - Federated log query
/// - `POST /api/logs/stats` - Grouped counts
/// - `POST /api/logs/paginate/init` - Open a pagination session
/// - `POST /api/logs/paginate/get` - Fetch a session page
///
/// ## Indices
/// - `GET /api/indices/list` - Catalog contents and status
/// - `POST /api/indices/config` - Change catalog configuration
/// - `POST /api/indices/refresh` - Refresh the catalog now
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::health_handler))
        .route("/health", get(handlers::health_handler))
        .route("/_liveness", get(handlers::liveness_handler))
        .nest("/api/logs", log_routes())
        .nest("/api/indices", index_routes())
        .with_state(state)
}

fn log_routes() -> Router<AppState> {
    Router::new()
        .route("/query", post(handlers::query_handler))
        .route("/stats", post(handlers::stats_handler))
        .route("/paginate/init", post(handlers::paginate_init_handler))
        .route("/paginate/get", post(handlers::paginate_get_handler))
}

fn index_routes() -> Router<AppState> {
    Router::new()
        .route("/list", get(handlers::list_handler))
        .route("/config", post(handlers::config_handler))
        .route("/refresh", post(handlers::refresh_handler))
}
