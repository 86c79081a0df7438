//! Log query, statistics and pagination handlers.

use axum::{extract::State, http::HeaderMap};
use serde::Deserialize;
use tracing::debug;

use kestrel_gateway::types::{LogQueryRequest, StatsRequest};

use crate::error::{RestError, RestResult};
use crate::extractors::{ApiJson, header_tenant};
use crate::responses::{Envelope, i18n};
use crate::state::AppState;

/// Handler for a log query.
///
/// # HTTP Request
///
/// `POST [base]/api/logs/query`
///
/// # Response
///
/// `data`: `{total, items, page_size, next_cursor?, next_cursor_after?, unavailable?}`
pub async fn query_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LogQueryRequest>,
) -> RestResult<Envelope> {
    debug!(tenant = %request.spec.tenant_id, "Processing log query");

    let page = state.service().query(&request).await?;
    Ok(Envelope::ok(i18n::INFO_QUERY_OK, to_data(&page)?))
}

/// Handler for grouped counts.
///
/// # HTTP Request
///
/// `POST [base]/api/logs/stats`
///
/// # Response
///
/// `data`: `{buckets: [{key, doc_count}], unavailable?}`
pub async fn stats_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<StatsRequest>,
) -> RestResult<Envelope> {
    debug!(tenant = %request.tenant_id, group_by = request.group_by.field(), "Processing stats query");

    let result = state.service().stats(&request).await?;
    Ok(Envelope::ok(i18n::INFO_STATS_OK, to_data(&result)?))
}

/// Handler that opens a pagination session.
///
/// # HTTP Request
///
/// `POST [base]/api/logs/paginate/init`
///
/// # Response
///
/// `data`: `{session_id, total_pages, total_items, page_size}`
pub async fn paginate_init_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LogQueryRequest>,
) -> RestResult<Envelope> {
    debug!(tenant = %request.spec.tenant_id, "Initialising pagination session");

    let init = state.service().init_pagination(&request).await?;
    Ok(Envelope::ok(i18n::INFO_QUERY_OK, to_data(&init)?))
}

/// Body of a session page fetch.
#[derive(Debug, Default, Deserialize)]
pub struct PageFetchRequest {
    /// Session to read from.
    #[serde(default)]
    pub session_id: Option<String>,
    /// 1-based page number.
    #[serde(default)]
    pub page: Option<i64>,
    /// Caller's tenant; falls back to the `X-Tenant-ID` header.
    #[serde(default)]
    pub tenant_id: Option<String>,
}

/// Handler that fetches one page of a pagination session.
///
/// # HTTP Request
///
/// `POST [base]/api/logs/paginate/get`
///
/// # Response
///
/// - `200` `data`: `{items, current_page, total_pages}`
/// - `400` code 3002 when `session_id`, `page` or the tenant is missing
/// - `410` code 3003 when the session is unknown, expired or not owned
/// - `400` code 3004 when the page is out of range
pub async fn paginate_get_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<PageFetchRequest>,
) -> RestResult<Envelope> {
    let session_id = request
        .session_id
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| invalid_param("session_id"))?;
    let page = request.page.ok_or_else(|| invalid_param("page"))?;
    let tenant_id = request
        .tenant_id
        .filter(|t| !t.trim().is_empty())
        .or_else(|| header_tenant(&headers))
        .ok_or_else(|| invalid_param("tenant_id"))?;

    debug!(session_id = %session_id, page, tenant = %tenant_id, "Fetching session page");

    let page = state.service().get_page(&session_id, page, &tenant_id).await?;
    Ok(Envelope::ok(i18n::INFO_QUERY_OK, to_data(&page)?))
}

fn invalid_param(name: &str) -> RestError {
    RestError::InvalidParam {
        name: name.to_string(),
    }
}

pub(crate) fn to_data<T: serde::Serialize>(value: &T) -> RestResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| RestError::Internal {
        message: format!("failed to serialize response: {}", e),
    })
}
