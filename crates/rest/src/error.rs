//! Error types for the HTTP API.
//!
//! Every error is answered with the JSON envelope and a matching HTTP status:
//!
//! | Error | HTTP Status | Code | Key |
//! |-------|-------------|------|-----|
//! | BackendUnavailable | 502 | 2001 | `error.es.connection` |
//! | BadInput | 400 | 3001 | `error.input.bad` |
//! | BadIndexConfig | 400 | 3001 | `error.indices.bad_config` |
//! | InvalidParam | 400 | 3002 | `error.input.invalid_param` |
//! | SessionExpired | 410 | 3003 | `error.pagination.session_expired` |
//! | InvalidPage | 400 | 3004 | `error.pagination.invalid_page` |
//! | Internal | 500 | 9000 | `error.internal` |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use kestrel_gateway::error::{
    BackendError, CatalogError, ConfigError, FederationError, GatewayError, SessionError,
};
use thiserror::Error;
use tracing::{error, warn};

use crate::responses::{Envelope, ResultCode, i18n};

/// The primary error type for HTTP API operations.
#[derive(Debug, Error)]
pub enum RestError {
    /// No cluster answered (HTTP 502).
    #[error("backend unavailable: {message}")]
    BackendUnavailable {
        /// What failed.
        message: String,
    },

    /// The request body could not be used (HTTP 400).
    #[error("bad input: {message}")]
    BadInput {
        /// Why the input was rejected.
        message: String,
    },

    /// An index catalog configuration change was rejected (HTTP 400).
    #[error("bad index configuration: {message}")]
    BadIndexConfig {
        /// Why the change was rejected.
        message: String,
    },

    /// A required parameter is missing or malformed (HTTP 400).
    #[error("invalid parameter: {name}")]
    InvalidParam {
        /// The parameter name.
        name: String,
    },

    /// The pagination session is unknown or has expired (HTTP 410).
    #[error("pagination session expired: {session_id}")]
    SessionExpired {
        /// The session id supplied.
        session_id: String,
    },

    /// The requested page is out of range (HTTP 400).
    #[error("page {page} is out of range (1..={total_pages})")]
    InvalidPage {
        /// The page requested.
        page: i64,
        /// Pages in the session.
        total_pages: u64,
    },

    /// Unexpected failure (HTTP 500).
    #[error("internal error: {message}")]
    Internal {
        /// What failed.
        message: String,
    },
}

impl RestError {
    /// Returns the HTTP status, application code and message key.
    pub fn parts(&self) -> (StatusCode, ResultCode, &'static str) {
        match self {
            RestError::BackendUnavailable { .. } => (
                StatusCode::BAD_GATEWAY,
                ResultCode::BackendConnection,
                i18n::ERROR_ES_CONNECTION,
            ),
            RestError::BadInput { .. } => (
                StatusCode::BAD_REQUEST,
                ResultCode::BadInput,
                i18n::ERROR_BAD_INPUT,
            ),
            RestError::BadIndexConfig { .. } => (
                StatusCode::BAD_REQUEST,
                ResultCode::BadInput,
                i18n::ERROR_INDICES_BAD_CONFIG,
            ),
            RestError::InvalidParam { .. } => (
                StatusCode::BAD_REQUEST,
                ResultCode::InvalidParam,
                i18n::ERROR_INVALID_PARAM,
            ),
            RestError::SessionExpired { .. } => (
                StatusCode::GONE,
                ResultCode::SessionExpired,
                i18n::ERROR_SESSION_EXPIRED,
            ),
            RestError::InvalidPage { .. } => (
                StatusCode::BAD_REQUEST,
                ResultCode::InvalidPage,
                i18n::ERROR_INVALID_PAGE,
            ),
            RestError::Internal { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ResultCode::Internal,
                i18n::ERROR_INTERNAL,
            ),
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let (status, code, key) = self.parts();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            warn!(error = %self, "request rejected");
        }
        (status, Json(Envelope::error(code, key))).into_response()
    }
}

/// Result type alias for handlers.
pub type RestResult<T> = Result<T, RestError>;

// Conversions from gateway errors

impl From<GatewayError> for RestError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Backend(e) => e.into(),
            GatewayError::Federation(e) => e.into(),
            GatewayError::Session(e) => e.into(),
            GatewayError::Catalog(e) => e.into(),
            GatewayError::Config(e) => e.into(),
        }
    }
}

impl From<BackendError> for RestError {
    fn from(err: BackendError) -> Self {
        RestError::BackendUnavailable {
            message: err.to_string(),
        }
    }
}

impl From<FederationError> for RestError {
    fn from(err: FederationError) -> Self {
        RestError::BackendUnavailable {
            message: err.to_string(),
        }
    }
}

impl From<SessionError> for RestError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Expired { session_id } => RestError::SessionExpired { session_id },
            SessionError::InvalidPage { page, total_pages } => {
                RestError::InvalidPage { page, total_pages }
            }
        }
    }
}

impl From<CatalogError> for RestError {
    fn from(err: CatalogError) -> Self {
        RestError::BadIndexConfig {
            message: err.to_string(),
        }
    }
}

impl From<ConfigError> for RestError {
    fn from(err: ConfigError) -> Self {
        RestError::Internal {
            message: err.to_string(),
        }
    }
}
