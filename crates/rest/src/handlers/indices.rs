//! Index catalog handlers.

use std::ops::RangeInclusive;

use axum::extract::State;
use serde_json::json;
use tracing::{debug, info};

use kestrel_gateway::catalog::CatalogConfigUpdate;

use crate::error::{RestError, RestResult};
use crate::extractors::ApiJson;
use crate::responses::{Envelope, i18n};
use crate::state::AppState;

/// Refresh intervals accepted over HTTP, in seconds.
pub const INTERVAL_RANGE: RangeInclusive<u64> = 5..=3600;

/// Handler that lists the catalog.
///
/// # HTTP Request
///
/// `GET [base]/api/indices/list`
///
/// # Response
///
/// `data`: `{items, status}`
pub async fn list_handler(State(state): State<AppState>) -> Envelope {
    debug!("Listing index catalog");
    catalog_envelope(&state, i18n::INFO_INDICES_OK)
}

/// Handler that changes the catalog configuration.
///
/// Absent fields are left unchanged. The interval must lie in
/// [`INTERVAL_RANGE`]; an invalid pattern rejects the whole change.
///
/// # HTTP Request
///
/// `POST [base]/api/indices/config`
///
/// # Response
///
/// - `200` `data`: `{status}`
/// - `400` code 3001 on an out-of-range interval or an invalid pattern
pub async fn config_handler(
    State(state): State<AppState>,
    ApiJson(update): ApiJson<CatalogConfigUpdate>,
) -> RestResult<Envelope> {
    if let Some(interval) = update.interval_seconds
        && !INTERVAL_RANGE.contains(&interval)
    {
        return Err(RestError::BadIndexConfig {
            message: format!(
                "interval_seconds must be between {} and {}, got {}",
                INTERVAL_RANGE.start(),
                INTERVAL_RANGE.end(),
                interval
            ),
        });
    }

    state.catalog().update_config(&update)?;
    info!("Index catalog configuration changed over HTTP");

    Ok(Envelope::ok(
        i18n::INFO_INDICES_CONFIG_OK,
        json!({ "status": state.catalog().status() }),
    ))
}

/// Handler that refreshes the catalog now.
///
/// # HTTP Request
///
/// `POST [base]/api/indices/refresh`
///
/// # Response
///
/// `data`: `{items, status}`
pub async fn refresh_handler(State(state): State<AppState>) -> Envelope {
    debug!("Refreshing index catalog on request");
    state.catalog().refresh_once().await;
    catalog_envelope(&state, i18n::INFO_INDICES_REFRESH_OK)
}

fn catalog_envelope(state: &AppState, key: &str) -> Envelope {
    let catalog = state.catalog();
    Envelope::ok(
        key,
        json!({
            "items": catalog.indices(),
            "status": catalog.status(),
        }),
    )
}
