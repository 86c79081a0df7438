//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use tracing::debug;

use crate::responses::{Envelope, i18n};
use crate::state::AppState;

/// Handler for the health check endpoint.
///
/// Reports liveness together with the index catalog status. Clusters are
/// not contacted.
///
/// # HTTP Request
///
/// `GET [base]/healthz` (also served at `[base]/health`)
pub async fn health_handler(State(state): State<AppState>) -> Envelope {
    debug!("Processing health check request");

    Envelope::ok(
        i18n::INFO_HEALTH_OK,
        json!({
            "status": "ok",
            "version": kestrel_gateway::VERSION,
            "catalog": state.catalog().status(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }),
    )
}

/// Handler for a bare liveness probe.
///
/// # HTTP Request
///
/// `GET [base]/_liveness`
pub async fn liveness_handler() -> impl IntoResponse {
    StatusCode::OK
}
