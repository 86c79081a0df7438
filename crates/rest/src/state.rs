//! Application state shared by every handler.

use std::sync::Arc;

use kestrel_gateway::catalog::IndexCatalog;
use kestrel_gateway::service::LogSearchService;

use crate::config::ServerConfig;

/// Shared application state.
///
/// Cloning is cheap; every field is reference counted.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use kestrel_rest::{AppState, ServerConfig};
///
/// let state = AppState::new(Arc::new(service), ServerConfig::default());
/// ```
#[derive(Debug, Clone)]
pub struct AppState {
    /// The log search service.
    service: Arc<LogSearchService>,

    /// Server configuration.
    config: Arc<ServerConfig>,
}

impl AppState {
    /// Creates the state from a service and the server configuration.
    pub fn new(service: Arc<LogSearchService>, config: ServerConfig) -> Self {
        Self {
            service,
            config: Arc::new(config),
        }
    }

    /// Returns the log search service.
    pub fn service(&self) -> &LogSearchService {
        &self.service
    }

    /// Returns the index catalog.
    pub fn catalog(&self) -> &IndexCatalog {
        self.service.catalog()
    }

    /// Returns the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
