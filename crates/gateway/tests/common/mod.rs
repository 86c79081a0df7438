//! Test infrastructure for the gateway.
//!
//! [`MockBackend`] stands in for a cluster: it returns canned search bodies,
//! can be switched into failure, can be slowed down, and records the calls it
//! receives.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use kestrel_gateway::core::{DynBackend, SearchBackend};
use kestrel_gateway::error::{BackendError, BackendResult};

/// One recorded search call.
#[derive(Debug, Clone)]
pub struct RecordedSearch {
    pub indices: Vec<String>,
    pub body: Value,
    pub doc_type: Option<String>,
}

/// An in-memory cluster.
#[derive(Debug)]
pub struct MockBackend {
    name: String,
    response: Mutex<Value>,
    catalog: Mutex<Vec<String>>,
    failing: AtomicBool,
    catalog_failing: AtomicBool,
    latency: Mutex<Duration>,
    search_calls: AtomicUsize,
    catalog_calls: AtomicUsize,
    searches: Mutex<Vec<RecordedSearch>>,
}

impl MockBackend {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            response: Mutex::new(search_response(0, vec![])),
            catalog: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
            catalog_failing: AtomicBool::new(false),
            latency: Mutex::new(Duration::ZERO),
            search_calls: AtomicUsize::new(0),
            catalog_calls: AtomicUsize::new(0),
            searches: Mutex::new(Vec::new()),
        })
    }

    pub fn with_hits(name: &str, total: u64, hits: Vec<Value>) -> Arc<Self> {
        let backend = Self::new(name);
        backend.set_response(search_response(total, hits));
        backend
    }

    pub fn with_catalog(name: &str, indices: &[&str]) -> Arc<Self> {
        let backend = Self::new(name);
        backend.set_catalog(indices);
        backend
    }

    pub fn failing(name: &str) -> Arc<Self> {
        let backend = Self::new(name);
        backend.set_failing(true);
        backend.set_catalog_failing(true);
        backend
    }

    pub fn set_response(&self, response: Value) {
        *self.response.lock() = response;
    }

    pub fn set_catalog(&self, indices: &[&str]) {
        *self.catalog.lock() = indices.iter().map(|s| s.to_string()).collect();
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_catalog_failing(&self, failing: bool) {
        self.catalog_failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn catalog_calls(&self) -> usize {
        self.catalog_calls.load(Ordering::SeqCst)
    }

    pub fn last_search(&self) -> Option<RecordedSearch> {
        self.searches.lock().last().cloned()
    }

    pub fn dyn_backend(self: &Arc<Self>) -> DynBackend {
        self.clone()
    }

    fn unavailable(&self) -> BackendError {
        BackendError::Unavailable {
            cluster: self.name.clone(),
            message: "connection refused".to_string(),
        }
    }
}

#[async_trait]
impl SearchBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute_search(
        &self,
        indices: &[String],
        body: &Value,
        doc_type: Option<&str>,
    ) -> BackendResult<Value> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.searches.lock().push(RecordedSearch {
            indices: indices.to_vec(),
            body: body.clone(),
            doc_type: doc_type.map(str::to_string),
        });

        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(self.unavailable());
        }
        Ok(self.response.lock().clone())
    }

    async fn fetch_catalog(&self) -> BackendResult<Vec<String>> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        if self.catalog_failing.load(Ordering::SeqCst) {
            return Err(self.unavailable());
        }
        Ok(self.catalog.lock().clone())
    }
}

/// Builds a search response body with an object-form total.
pub fn search_response(total: u64, hits: Vec<Value>) -> Value {
    json!({
        "hits": {
            "total": { "value": total, "relation": "eq" },
            "hits": hits
        }
    })
}

/// Builds a hit with a timestamp and a sort array.
pub fn hit(id: &str, timestamp: &str) -> Value {
    json!({
        "_id": id,
        "_source": { "timestamp": timestamp, "message": format!("message {id}") },
        "sort": [timestamp, id]
    })
}

/// Builds a terms aggregation response.
pub fn buckets_response(buckets: &[(&str, u64)]) -> Value {
    let buckets: Vec<Value> = buckets
        .iter()
        .map(|(key, count)| json!({ "key": key, "doc_count": count }))
        .collect();
    json!({
        "hits": { "total": { "value": 0 }, "hits": [] },
        "aggregations": { "group_stats": { "buckets": buckets } }
    })
}

/// Upcasts a list of mocks.
pub fn dyn_backends(backends: &[Arc<MockBackend>]) -> Vec<DynBackend> {
    backends.iter().map(|b| b.dyn_backend()).collect()
}
