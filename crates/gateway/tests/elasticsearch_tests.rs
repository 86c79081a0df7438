//! Cluster connection tests against a real Elasticsearch instance.
//!
//! Tests that need a server use testcontainers to start one in Docker and
//! share it across the test binary.
//!
//! Run with: `cargo test -p kestrel-gateway --features es-integration -- es_integration`

#![cfg(feature = "es-integration")]

mod common;

use kestrel_gateway::backends::elasticsearch::{
    ClusterConfig, ClusterConnection, ClusterEndpoint, DetectedVersion, connect_all,
};
use kestrel_gateway::core::SearchBackend;
use kestrel_gateway::error::{ConfigError, GatewayError};

// ============================================================================
// Configuration Tests (no ES instance required)
// ============================================================================

#[test]
fn test_connect_all_skips_blank_hosts() {
    let config = ClusterConfig {
        hosts: vec![
            "http://es-a:9200/".to_string(),
            "  ".to_string(),
            "http://es-b:9200".to_string(),
        ],
        ..Default::default()
    };
    let backends = connect_all(&config).unwrap();
    let names: Vec<&str> = backends.iter().map(|b| b.name()).collect();
    assert_eq!(names, vec!["http://es-a:9200", "http://es-b:9200"]);
}

#[test]
fn test_connect_all_requires_a_host() {
    let config = ClusterConfig {
        hosts: vec![],
        ..Default::default()
    };
    assert!(matches!(
        connect_all(&config),
        Err(GatewayError::Config(ConfigError::NoClusters))
    ));
}

#[test]
fn test_version_paths() {
    let legacy = DetectedVersion::new(6);
    let modern = DetectedVersion::new(7);
    let indices = vec!["a".to_string(), "b".to_string()];
    assert_eq!(legacy.search_path(&indices, Some("log")), "/a,b/log/_search");
    assert_eq!(modern.search_path(&indices, Some("log")), "/a,b/_search");
}

// ============================================================================
// Integration Tests (requires Docker for testcontainers)
// ============================================================================

#[cfg(test)]
mod es_integration {
    use std::sync::Arc;
    use std::time::Duration;

    use elasticsearch::http::transport::Transport;
    use elasticsearch::params::Refresh;
    use elasticsearch::{Elasticsearch, IndexParts};
    use serde_json::{Value, json};

    use kestrel_gateway::catalog::{CatalogConfig, IndexCatalog};
    use kestrel_gateway::core::DynBackend;
    use kestrel_gateway::federation::FederationCoordinator;
    use kestrel_gateway::observability::noop;
    use kestrel_gateway::pagination::SessionStore;
    use kestrel_gateway::query::{AdapterConfig, QueryAdapter};
    use kestrel_gateway::service::{LogSearchService, ServiceConfig};
    use kestrel_gateway::types::{IndexTarget, LogQueryRequest, SearchRequestSpec};

    use super::*;
    use crate::common::MockBackend;

    use testcontainers::ImageExt;
    use testcontainers::runners::AsyncRunner;
    use testcontainers_modules::elastic_search::ElasticSearch;
    use tokio::sync::OnceCell;

    /// Shared Elasticsearch container reused across all tests in this module.
    struct SharedEs {
        url: String,
        /// Kept alive for the duration of the test binary; dropped at process exit.
        _container: testcontainers::ContainerAsync<ElasticSearch>,
    }

    static SHARED_ES: OnceCell<SharedEs> = OnceCell::const_new();

    async fn shared_es() -> &'static SharedEs {
        SHARED_ES
            .get_or_init(|| async {
                let run_id = std::env::var("GITHUB_RUN_ID").unwrap_or_default();
                let container = ElasticSearch::default()
                    .with_env_var("ES_JAVA_OPTS", "-Xms256m -Xmx256m")
                    .with_label("github.run_id", &run_id)
                    .with_startup_timeout(Duration::from_secs(120))
                    .start()
                    .await
                    .expect("Failed to start Elasticsearch container");

                let port = container
                    .get_host_port_ipv4(9200)
                    .await
                    .expect("Failed to get host port");
                let host = container
                    .get_host()
                    .await
                    .expect("Failed to get host")
                    .to_string();

                SharedEs {
                    url: format!("http://{}:{}", host, port),
                    _container: container,
                }
            })
            .await
    }

    /// Creates a uniquely named index holding `docs`, refreshed for search.
    async fn seed_index(docs: &[Value]) -> String {
        let es = shared_es().await;
        let index = format!("kst-logs-it-{}", uuid::Uuid::new_v4().simple());
        let client = Elasticsearch::new(Transport::single_node(&es.url).expect("transport"));

        for (i, doc) in docs.iter().enumerate() {
            let id = format!("doc-{i:03}");
            let response = client
                .index(IndexParts::IndexId(&index, &id))
                .body(doc.clone())
                .refresh(Refresh::True)
                .send()
                .await
                .expect("index request");
            assert!(response.status_code().is_success());
        }
        index
    }

    fn log(tenant: &str, second: u32, message: &str) -> Value {
        json!({
            "tenant_id": tenant,
            "timestamp": format!("2024-05-01T10:00:{second:02}Z"),
            "message": message,
            "level": "INFO",
        })
    }

    async fn connection() -> ClusterConnection {
        let es = shared_es().await;
        ClusterConnection::new(ClusterEndpoint::from_url(&es.url).unwrap())
    }

    #[tokio::test]
    async fn es_integration_detects_modern_version() {
        let conn = connection().await;
        let version = conn.detect_version().await;
        assert!(version.major() >= 7);
        assert_eq!(
            conn.search_path(&["a".to_string()], Some("log")).await,
            "/a/_search"
        );
    }

    #[tokio::test]
    async fn es_integration_catalog_lists_seeded_index() {
        let index = seed_index(&[log("acme", 1, "hello")]).await;
        let conn = connection().await;
        let names = conn.fetch_catalog().await.unwrap();
        assert!(names.contains(&index));
    }

    #[tokio::test]
    async fn es_integration_get_document() {
        let index = seed_index(&[log("acme", 1, "hello")]).await;
        let conn = connection().await;

        let doc = conn.get_document(&index, "doc-000", None).await.unwrap();
        assert_eq!(doc.unwrap()["_source"]["message"], "hello");
        assert!(conn.get_document(&index, "missing", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn es_integration_tenant_scoped_query() {
        let index = seed_index(&[
            log("acme", 1, "first"),
            log("acme", 2, "second"),
            log("globex", 3, "other tenant"),
        ])
        .await;

        let conn: DynBackend = Arc::new(connection().await);
        let adapter = QueryAdapter::new(AdapterConfig::default());
        let dsl = adapter.build(&SearchRequestSpec::new("acme"));
        let body = conn
            .execute_search(std::slice::from_ref(&index), dsl.body(), None)
            .await
            .unwrap();

        let hits = body["hits"]["hits"].as_array().unwrap();
        assert_eq!(hits.len(), 2);
        // Newest first
        assert_eq!(hits[0]["_source"]["message"], "second");
    }

    #[tokio::test]
    async fn es_integration_service_with_unreachable_peer() {
        let index = seed_index(&[log("acme", 1, "a"), log("acme", 2, "b")]).await;

        let live: DynBackend = Arc::new(connection().await);
        let dead = MockBackend::failing("dead");
        let backends = vec![live, dead.dyn_backend()];

        let catalog = IndexCatalog::new(backends.clone(), CatalogConfig::default(), noop()).unwrap();
        catalog.refresh_once().await;
        assert!(catalog.indices().contains(&index));

        let adapter = QueryAdapter::new(AdapterConfig::default());
        let coordinator = FederationCoordinator::new(backends, adapter.timestamp_field());
        let service = LogSearchService::new(
            adapter,
            Arc::new(catalog),
            coordinator,
            SessionStore::default(),
            ServiceConfig::default(),
        );

        let request = LogQueryRequest::new(SearchRequestSpec::new("acme")).with_target(IndexTarget {
            index_keyword: Some(index.clone()),
            ..Default::default()
        });
        let page = service.query(&request).await.unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(page.unavailable, vec!["dead".to_string()]);
        assert_eq!(page.items[0]["_source"]["message"], "b");
    }
}
