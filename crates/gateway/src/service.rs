//! Log search operations composed from the core components.
//!
//! [`LogSearchService`] resolves target indices through the catalog, builds
//! bodies with the query adapter, runs them through the federation
//! coordinator, and keeps pagination sessions. Every collaborator is passed
//! in explicitly; nothing here is global.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::catalog::IndexCatalog;
use crate::error::{GatewayResult, SessionError};
use crate::federation::FederationCoordinator;
use crate::pagination::SessionStore;
use crate::query::QueryAdapter;
use crate::types::{
    AggregatedResult, IndexTarget, LogQueryRequest, PaginationMode, StatsRequest,
};

/// Most indices a single query may target.
pub const MAX_TARGET_INDICES: usize = 200;

/// Index defaults for the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Indices searched when a request names none (default: `["logs-*"]`).
    #[serde(default = "default_indices")]
    pub default_indices: Vec<String>,

    /// Legacy document type, used against clusters at or below 6.x.
    #[serde(default)]
    pub doc_type: Option<String>,
}

fn default_indices() -> Vec<String> {
    vec!["logs-*".to_string()]
}

/// Characters an index name may not contain besides whitespace.
const FORBIDDEN_INDEX_CHARS: &[char] = &['/', '\\', '?', '#', '"', '<', '>', '|', ','];

/// Returns true if `name` can be sent to a cluster as one index expression.
///
/// Wildcards are allowed. Blank names, whitespace, and the characters a
/// cluster rejects in index names are not.
pub fn is_index_expression(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || FORBIDDEN_INDEX_CHARS.contains(&c))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_indices: default_indices(),
            doc_type: None,
        }
    }
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPage {
    /// Matching documents across reachable clusters.
    pub total: u64,
    /// Raw hits for this page.
    pub items: Vec<Value>,
    /// Effective page size.
    pub page_size: u64,
    /// Opaque token for the next page, in cursor mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    /// Raw sort values of the last hit, in cursor mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor_after: Option<Vec<Value>>,
    /// Clusters left out of this result.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unavailable: Vec<String>,
}

/// Metadata of a newly created pagination session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInit {
    /// Session identifier.
    pub session_id: String,
    /// Number of pages.
    pub total_pages: u64,
    /// Number of matching documents.
    pub total_items: u64,
    /// Hits per page.
    pub page_size: u64,
}

/// One page fetched through a pagination session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPage {
    /// Raw hits for this page.
    pub items: Vec<Value>,
    /// The page returned.
    pub current_page: i64,
    /// Number of pages in the session.
    pub total_pages: u64,
    /// Clusters left out of this result.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unavailable: Vec<String>,
}

/// Log search over federated clusters.
#[derive(Debug)]
pub struct LogSearchService {
    adapter: QueryAdapter,
    catalog: Arc<IndexCatalog>,
    coordinator: FederationCoordinator,
    sessions: SessionStore,
    config: ServiceConfig,
}

impl LogSearchService {
    /// Creates a service from its collaborators.
    pub fn new(
        adapter: QueryAdapter,
        catalog: Arc<IndexCatalog>,
        coordinator: FederationCoordinator,
        sessions: SessionStore,
        mut config: ServiceConfig,
    ) -> Self {
        config.default_indices.retain(|name| is_index_expression(name));
        if config.default_indices.is_empty() {
            config.default_indices = default_indices();
        }
        Self {
            adapter,
            catalog,
            coordinator,
            sessions,
            config,
        }
    }

    /// Returns the index catalog.
    pub fn catalog(&self) -> &Arc<IndexCatalog> {
        &self.catalog
    }

    /// Returns the session store.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Returns the query adapter.
    pub fn adapter(&self) -> &QueryAdapter {
        &self.adapter
    }

    /// Returns the federation coordinator.
    pub fn coordinator(&self) -> &FederationCoordinator {
        &self.coordinator
    }

    /// Picks the indices a request targets.
    ///
    /// An explicit override wins; otherwise a supplied keyword (even empty)
    /// is looked up in the catalog with fuzzy fallback; otherwise the default
    /// indices are used. Override entries that are not valid index
    /// expressions are dropped. An empty result falls back to the defaults.
    /// At most [`MAX_TARGET_INDICES`] are returned.
    pub fn resolve_indices(&self, target: &IndexTarget) -> Vec<String> {
        let mut indices = if !target.override_indexes.is_empty() {
            let (valid, rejected): (Vec<String>, Vec<String>) = target
                .override_indexes
                .iter()
                .map(|name| name.trim().to_string())
                .partition(|name| is_index_expression(name));
            if !rejected.is_empty() {
                warn!(rejected = ?rejected, "dropping invalid index overrides");
            }
            valid
        } else if let Some(keyword) = &target.index_keyword {
            self.catalog.find_indices(keyword, target.use_regex, true)
        } else {
            self.config.default_indices.clone()
        };

        if indices.is_empty() {
            indices = self.config.default_indices.clone();
        }
        indices.truncate(MAX_TARGET_INDICES);
        indices
    }

    fn doc_type(&self) -> Option<&str> {
        self.config.doc_type.as_deref().filter(|t| !t.is_empty())
    }

    /// Runs a query and returns one page.
    #[instrument(skip(self, request), fields(tenant = %request.spec.tenant_id, mode = request.spec.mode.as_str()))]
    pub async fn query(&self, request: &LogQueryRequest) -> GatewayResult<QueryPage> {
        let indices = self.resolve_indices(&request.target);
        let dsl = self.adapter.build(&request.spec);
        debug!(indices = ?indices, "resolved query indices");

        let merged = self
            .coordinator
            .search(&indices, &dsl, self.doc_type())
            .await?;

        let (next_cursor, next_cursor_after) = match request.spec.mode {
            PaginationMode::Cursor => match merged.next_cursor() {
                Some(token) => (Some(token.encode()), Some(token.into_sort_values())),
                None => (None, None),
            },
            PaginationMode::Page => (None, None),
        };

        Ok(QueryPage {
            total: merged.total,
            items: merged.hits,
            page_size: self.adapter.page_size(&request.spec),
            next_cursor,
            next_cursor_after,
            unavailable: merged.unavailable,
        })
    }

    /// Counts the matches of a query and opens a pagination session over it.
    ///
    /// The frozen query is always in page mode.
    #[instrument(skip(self, request), fields(tenant = %request.spec.tenant_id))]
    pub async fn init_pagination(&self, request: &LogQueryRequest) -> GatewayResult<PaginationInit> {
        let mut frozen = request.clone();
        frozen.spec.mode = PaginationMode::Page;
        frozen.spec.cursor = None;

        let indices = self.resolve_indices(&frozen.target);
        let dsl = self.adapter.count_only(&frozen.spec);
        let merged = self
            .coordinator
            .search(&indices, &dsl, self.doc_type())
            .await?;

        let page_size = self.adapter.page_size(&frozen.spec);
        let tenant_id = frozen.spec.tenant_id.clone();
        let session = self
            .sessions
            .create_session(tenant_id, frozen, merged.total, page_size);

        Ok(PaginationInit {
            session_id: session.session_id.clone(),
            total_pages: session.total_pages,
            total_items: session.total_items,
            page_size: session.page_size,
        })
    }

    /// Fetches one page of an existing session.
    ///
    /// Fails with [`SessionError::Expired`] when the session is unknown,
    /// expired, or owned by another tenant, and with
    /// [`SessionError::InvalidPage`] when the page is out of range.
    #[instrument(skip(self))]
    pub async fn get_page(
        &self,
        session_id: &str,
        page: i64,
        tenant_id: &str,
    ) -> GatewayResult<SessionPage> {
        let session = self
            .sessions
            .get_owned_session(session_id, tenant_id)
            .ok_or_else(|| SessionError::Expired {
                session_id: session_id.to_string(),
            })?;

        if !session.is_valid_page(page) {
            return Err(SessionError::InvalidPage {
                page,
                total_pages: session.total_pages,
            }
            .into());
        }

        let mut spec = session.query.spec.clone();
        spec.pagination.page = page;

        let indices = self.resolve_indices(&session.query.target);
        let dsl = self.adapter.build(&spec);
        let merged = self
            .coordinator
            .search(&indices, &dsl, self.doc_type())
            .await?;

        Ok(SessionPage {
            items: merged.hits,
            current_page: page,
            total_pages: session.total_pages,
            unavailable: merged.unavailable,
        })
    }

    /// Counts documents per group over a time window.
    #[instrument(skip(self, request), fields(tenant = %request.tenant_id, group_by = request.group_by.field()))]
    pub async fn stats(&self, request: &StatsRequest) -> GatewayResult<AggregatedResult> {
        let indices = self.resolve_indices(&request.target);
        let dsl = self
            .adapter
            .build_stats(&request.tenant_id, &request.time_range, request.group_by);
        Ok(self
            .coordinator
            .aggregate(&indices, &dsl, self.doc_type())
            .await?)
    }
}
