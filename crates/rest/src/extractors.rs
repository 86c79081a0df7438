//! Request extractors.

use axum::{
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::{HeaderMap, header::HeaderName},
};
use serde::de::DeserializeOwned;

use crate::error::RestError;

/// Header carrying the caller's tenant id.
pub static X_TENANT_ID: HeaderName = HeaderName::from_static("x-tenant-id");

/// JSON body extractor whose rejection is the bad-input envelope instead of
/// axum's plain-text rejection.
///
/// # Example
///
/// ```rust,ignore
/// use kestrel_rest::extractors::ApiJson;
///
/// async fn handler(ApiJson(request): ApiJson<LogQueryRequest>) { /* ... */ }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(bad_input(rejection)),
        }
    }
}

fn bad_input(rejection: JsonRejection) -> RestError {
    RestError::BadInput {
        message: rejection.body_text(),
    }
}

/// Returns the non-blank tenant id from the `X-Tenant-ID` header.
pub fn header_tenant(headers: &HeaderMap) -> Option<String> {
    headers
        .get(&X_TENANT_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}
