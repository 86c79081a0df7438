//! Concurrent fan-out of one query to every configured cluster.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{debug, instrument, warn};

use crate::core::DynBackend;
use crate::error::{BackendResult, FederationError};
use crate::observability::{DynObserver, noop};
use crate::query::SearchDsl;
use crate::types::{AggregatedResult, MergedResult, response_buckets};

use super::merger::{merge_buckets, merge_responses};

/// One cluster's outcome.
struct ClusterOutcome {
    cluster: String,
    result: BackendResult<Value>,
}

/// Executes queries against every configured cluster and merges the results.
///
/// Each query runs `Dispatch -> AwaitAll -> Merge`: the identical body goes to
/// every cluster concurrently, the coordinator waits for every cluster to
/// answer or fail, and failed clusters are left out of the merge. Only when
/// every cluster fails does the query fail, with
/// [`FederationError::AllBackendsUnavailable`].
///
/// With a single cluster the call goes straight to that connection and the
/// response is returned without re-ordering.
pub struct FederationCoordinator {
    backends: Vec<DynBackend>,
    timestamp_field: String,
    observer: DynObserver,
    debug_queries: bool,
}

impl std::fmt::Debug for FederationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FederationCoordinator")
            .field("clusters", &self.cluster_names())
            .field("timestamp_field", &self.timestamp_field)
            .field("debug_queries", &self.debug_queries)
            .finish_non_exhaustive()
    }
}

impl FederationCoordinator {
    /// Creates a coordinator over the given clusters.
    pub fn new(backends: Vec<DynBackend>, timestamp_field: impl Into<String>) -> Self {
        Self {
            backends,
            timestamp_field: timestamp_field.into(),
            observer: noop(),
            debug_queries: false,
        }
    }

    /// Sets the observer.
    pub fn with_observer(mut self, observer: DynObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Logs every dispatched body at debug level.
    pub fn with_debug_queries(mut self, enabled: bool) -> Self {
        self.debug_queries = enabled;
        self
    }

    /// Returns the configured clusters.
    pub fn backends(&self) -> &[DynBackend] {
        &self.backends
    }

    /// Returns the cluster names.
    pub fn cluster_names(&self) -> Vec<String> {
        self.backends.iter().map(|b| b.name().to_string()).collect()
    }

    /// Runs a search and merges hits.
    ///
    /// The merged hit list never exceeds the body's `size`.
    #[instrument(skip(self, indices, dsl), fields(index_count = indices.len(), clusters = self.backends.len()))]
    pub async fn search(
        &self,
        indices: &[String],
        dsl: &SearchDsl,
        doc_type: Option<&str>,
    ) -> Result<MergedResult, FederationError> {
        let size = dsl.size() as usize;
        let (responses, unavailable) = self.dispatch(indices, dsl, doc_type).await?;

        let mut merged = if responses.len() == 1 && self.backends.len() == 1 {
            let mut result = MergedResult::from_response(&responses[0]);
            result.hits.truncate(size);
            result
        } else {
            merge_responses(&responses, &self.timestamp_field, size)
        };
        merged.unavailable = unavailable;
        Ok(merged)
    }

    /// Runs a grouped-count query and merges buckets by key.
    #[instrument(skip(self, indices, dsl), fields(index_count = indices.len(), clusters = self.backends.len()))]
    pub async fn aggregate(
        &self,
        indices: &[String],
        dsl: &SearchDsl,
        doc_type: Option<&str>,
    ) -> Result<AggregatedResult, FederationError> {
        let (responses, unavailable) = self.dispatch(indices, dsl, doc_type).await?;
        Ok(AggregatedResult {
            buckets: merge_buckets(responses.iter().map(response_buckets)),
            unavailable,
        })
    }

    /// Dispatch and AwaitAll: returns successful bodies in cluster order, and
    /// the names of the clusters that failed.
    async fn dispatch(
        &self,
        indices: &[String],
        dsl: &SearchDsl,
        doc_type: Option<&str>,
    ) -> Result<(Vec<Value>, Vec<String>), FederationError> {
        if self.debug_queries {
            debug!(
                clusters = ?self.cluster_names(),
                indices = ?indices,
                body = %dsl.body(),
                "dispatching query"
            );
        }

        let outcomes = match self.backends.as_slice() {
            [] => Vec::new(),
            [backend] => {
                let started = Instant::now();
                let result = backend.execute_search(indices, dsl.body(), doc_type).await;
                self.observer.backend_latency("search", started.elapsed());
                vec![ClusterOutcome {
                    cluster: backend.name().to_string(),
                    result,
                }]
            }
            _ => self.fan_out(indices, dsl, doc_type).await,
        };

        let attempted = self.backends.len();
        let mut responses = Vec::with_capacity(outcomes.len());
        let mut unavailable = Vec::new();
        for outcome in outcomes {
            match outcome.result {
                Ok(body) => responses.push(body),
                Err(e) => {
                    warn!(cluster = %outcome.cluster, error = %e, "cluster search failed");
                    self.observer.cluster_failed(&outcome.cluster);
                    unavailable.push(outcome.cluster);
                }
            }
        }

        if responses.is_empty() {
            return Err(FederationError::AllBackendsUnavailable { attempted });
        }
        Ok((responses, unavailable))
    }

    /// Runs the body on every cluster concurrently, one task per cluster.
    async fn fan_out(
        &self,
        indices: &[String],
        dsl: &SearchDsl,
        doc_type: Option<&str>,
    ) -> Vec<ClusterOutcome> {
        let indices: Arc<[String]> = indices.into();
        let body = Arc::new(dsl.body().clone());
        let doc_type: Option<Arc<str>> = doc_type.map(Into::into);

        let mut tasks: JoinSet<(usize, BackendResult<Value>)> = JoinSet::new();
        for (position, backend) in self.backends.iter().enumerate() {
            let backend = backend.clone();
            let indices = indices.clone();
            let body = body.clone();
            let doc_type = doc_type.clone();
            let observer = self.observer.clone();
            tasks.spawn(async move {
                let started = Instant::now();
                let result = backend
                    .execute_search(&indices, &body, doc_type.as_deref())
                    .await;
                observer.backend_latency("search", started.elapsed());
                (position, result)
            });
        }

        let mut results: Vec<Option<BackendResult<Value>>> =
            (0..self.backends.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((position, result)) => results[position] = Some(result),
                Err(e) => warn!(error = %e, "cluster search task failed"),
            }
        }

        self.backends
            .iter()
            .zip(results)
            .map(|(backend, result)| ClusterOutcome {
                cluster: backend.name().to_string(),
                result: result.unwrap_or_else(|| {
                    Err(crate::error::BackendError::Unavailable {
                        cluster: backend.name().to_string(),
                        message: "search task aborted".to_string(),
                    })
                }),
            })
            .collect()
    }
}
