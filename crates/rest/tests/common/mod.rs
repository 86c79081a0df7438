//! Test infrastructure for the HTTP surface.
//!
//! [`MockBackend`] stands in for a cluster; [`test_server`] wires mocks into
//! the full application behind an `axum-test` server.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use axum_test::TestServer;
use parking_lot::Mutex;
use serde_json::{Value, json};

use kestrel_gateway::core::{DynBackend, SearchBackend};
use kestrel_gateway::error::{BackendError, BackendResult};
use kestrel_gateway::observability;
use kestrel_gateway::service::LogSearchService;
use kestrel_rest::{ServerConfig, build_service, create_app};

/// An in-memory cluster.
#[derive(Debug)]
pub struct MockBackend {
    name: String,
    response: Mutex<Value>,
    catalog: Mutex<Vec<String>>,
    failing: AtomicBool,
    search_calls: AtomicUsize,
    bodies: Mutex<Vec<Value>>,
}

impl MockBackend {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            response: Mutex::new(search_response(0, vec![])),
            catalog: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
            search_calls: AtomicUsize::new(0),
            bodies: Mutex::new(Vec::new()),
        })
    }

    pub fn with_hits(name: &str, total: u64, hits: Vec<Value>) -> Arc<Self> {
        let backend = Self::new(name);
        backend.set_response(search_response(total, hits));
        backend
    }

    pub fn failing(name: &str) -> Arc<Self> {
        let backend = Self::new(name);
        backend.failing.store(true, Ordering::SeqCst);
        backend
    }

    pub fn set_response(&self, response: Value) {
        *self.response.lock() = response;
    }

    pub fn set_catalog(&self, indices: &[&str]) {
        *self.catalog.lock() = indices.iter().map(|s| s.to_string()).collect();
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn last_body(&self) -> Option<Value> {
        self.bodies.lock().last().cloned()
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
        _indices: &[String],
        body: &Value,
        _doc_type: Option<&str>,
    ) -> BackendResult<Value> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.bodies.lock().push(body.clone());
        if self.failing.load(Ordering::SeqCst) {
            return Err(self.unavailable());
        }
        Ok(self.response.lock().clone())
    }

    async fn fetch_catalog(&self) -> BackendResult<Vec<String>> {
        if self.failing.load(Ordering::SeqCst) {
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

/// Starts a test server over the given mocks with the test configuration.
pub fn test_server(backends: &[Arc<MockBackend>]) -> (TestServer, Arc<LogSearchService>) {
    test_server_with_config(backends, ServerConfig::for_testing())
}

/// Starts a test server over the given mocks.
pub fn test_server_with_config(
    backends: &[Arc<MockBackend>],
    config: ServerConfig,
) -> (TestServer, Arc<LogSearchService>) {
    let backends: Vec<DynBackend> = backends.iter().map(|b| b.clone() as DynBackend).collect();
    let service = build_service(&config, backends, observability::noop())
        .expect("Failed to build service");
    let app = create_app(service.clone(), config);
    let server = TestServer::new(app).expect("Failed to create test server");
    (server, service)
}
