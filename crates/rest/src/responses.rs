//! The JSON envelope every endpoint answers with.
//!
//! ```json
//! { "code": 0, "i18n_key": "info.query.ok", "data": { ... } }
//! ```
//!
//! `code` is an application code, not the HTTP status; `i18n_key` names the
//! message for clients to translate.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Application result codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ResultCode {
    /// Success.
    Ok = 0,
    /// No cluster could be reached.
    BackendConnection = 2001,
    /// The request body or configuration was rejected.
    BadInput = 3001,
    /// A required parameter is missing or malformed.
    InvalidParam = 3002,
    /// The pagination session is unknown or has expired.
    SessionExpired = 3003,
    /// The requested page is out of range.
    InvalidPage = 3004,
    /// Unexpected failure.
    Internal = 9000,
}

impl ResultCode {
    /// Returns the numeric code.
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

/// Message keys.
pub mod i18n {
    #![allow(missing_docs)]

    pub const INFO_HEALTH_OK: &str = "info.health.ok";
    pub const INFO_QUERY_OK: &str = "info.query.ok";
    pub const INFO_STATS_OK: &str = "info.stats.ok";
    pub const INFO_INDICES_OK: &str = "info.indices.ok";
    pub const INFO_INDICES_CONFIG_OK: &str = "info.indices.config.ok";
    pub const INFO_INDICES_REFRESH_OK: &str = "info.indices.refresh.ok";

    pub const ERROR_ES_CONNECTION: &str = "error.es.connection";
    pub const ERROR_BAD_INPUT: &str = "error.input.bad";
    pub const ERROR_INVALID_PARAM: &str = "error.input.invalid_param";
    pub const ERROR_SESSION_EXPIRED: &str = "error.pagination.session_expired";
    pub const ERROR_INVALID_PAGE: &str = "error.pagination.invalid_page";
    pub const ERROR_INDICES_BAD_CONFIG: &str = "error.indices.bad_config";
    pub const ERROR_INTERNAL: &str = "error.internal";
}

/// A response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Application result code.
    pub code: u32,
    /// Message key.
    pub i18n_key: String,
    /// Payload; an empty object on errors.
    pub data: Value,
}

impl Envelope {
    /// Creates an envelope.
    pub fn new(code: ResultCode, i18n_key: &str, data: Value) -> Self {
        Self {
            code: code.as_u32(),
            i18n_key: i18n_key.to_string(),
            data,
        }
    }

    /// Creates a success envelope.
    pub fn ok(i18n_key: &str, data: Value) -> Self {
        Self::new(ResultCode::Ok, i18n_key, data)
    }

    /// Creates an error envelope with an empty payload.
    pub fn error(code: ResultCode, i18n_key: &str) -> Self {
        Self::new(code, i18n_key, json!({}))
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
