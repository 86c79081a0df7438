//! Backend abstraction for search clusters.
//!
//! The federation coordinator and the index catalog only talk to clusters
//! through [`SearchBackend`]. The production implementation is
//! [`ClusterConnection`](crate::backends::elasticsearch::ClusterConnection);
//! tests substitute in-memory backends.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::BackendResult;

/// One search cluster.
///
/// Implementations must not retry. A failed call is reported immediately as a
/// [`BackendError`](crate::error::BackendError) and the caller applies its own
/// resilience policy.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Returns a name identifying the cluster in logs and results.
    fn name(&self) -> &str;

    /// Submits a search body against one or more indices.
    ///
    /// Returns the raw decoded response body.
    async fn execute_search(
        &self,
        indices: &[String],
        body: &Value,
        doc_type: Option<&str>,
    ) -> BackendResult<Value>;

    /// Lists every index name the cluster reports.
    async fn fetch_catalog(&self) -> BackendResult<Vec<String>>;
}

/// Shared handle to a backend.
pub type DynBackend = Arc<dyn SearchBackend>;
