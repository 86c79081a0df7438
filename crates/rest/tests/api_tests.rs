//! HTTP API tests.
//!
//! Covers the response envelope, result codes and HTTP statuses for every
//! endpoint, running the full application over in-memory clusters.

mod common;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use serde_json::{Value, json};

use common::{MockBackend, hit, search_response, test_server, test_server_with_config};
use kestrel_rest::ServerConfig;

const X_TENANT_ID: HeaderName = HeaderName::from_static("x-tenant-id");

fn assert_envelope(body: &Value, code: u64, key: &str) {
    assert_eq!(body["code"], code, "unexpected envelope: {body}");
    assert_eq!(body["i18n_key"], key, "unexpected envelope: {body}");
    assert!(body["data"].is_object(), "data must be an object: {body}");
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let (server, _) = test_server(&[MockBackend::new("a")]);

    let response = server.get("/healthz").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_envelope(&body, 0, "info.health.ok");
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["catalog"]["enabled"], false);
    assert!(body["data"]["version"].is_string());
}

#[tokio::test]
async fn test_healthz_and_health_alias() {
    let (server, _) = test_server(&[MockBackend::new("a")]);

    for path in ["/healthz", "/health"] {
        let response = server.get(path).await;
        response.assert_status_ok();
        assert_envelope(&response.json(), 0, "info.health.ok");
    }
}

#[tokio::test]
async fn test_liveness() {
    let (server, _) = test_server(&[MockBackend::new("a")]);
    server.get("/_liveness").await.assert_status_ok();
}

// =============================================================================
// Query
// =============================================================================

#[tokio::test]
async fn test_query_merges_clusters() {
    let a = MockBackend::with_hits("a", 2, vec![hit("a1", "2024-01-01T00:00:03Z")]);
    let b = MockBackend::with_hits("b", 3, vec![hit("b1", "2024-01-01T00:00:05Z")]);
    let (server, _) = test_server(&[a.clone(), b.clone()]);

    let response = server
        .post("/api/logs/query")
        .json(&json!({ "tenant_id": "acme", "pagination": { "page": 1, "page_size": 10 } }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_envelope(&body, 0, "info.query.ok");
    assert_eq!(body["data"]["total"], 5);
    assert_eq!(body["data"]["page_size"], 10);

    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["_id"], "b1");
    assert!(body["data"].get("next_cursor").is_none());
    assert!(body["data"].get("unavailable").is_none());

    assert_eq!(a.search_calls(), 1);
    assert_eq!(b.search_calls(), 1);
}

#[tokio::test]
async fn test_query_page_size_is_clamped() {
    let a = MockBackend::new("a");
    let (server, _) = test_server(&[a.clone()]);

    let response = server
        .post("/api/logs/query")
        .json(&json!({ "tenant_id": "acme", "pagination": { "page": 1, "page_size": 500 } }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["data"]["page_size"], 20);
    assert_eq!(a.last_body().unwrap()["size"], 20);
}

#[tokio::test]
async fn test_query_cursor_mode_returns_token() {
    let a = MockBackend::with_hits(
        "a",
        2,
        vec![
            hit("a2", "2024-01-01T00:00:02Z"),
            hit("a1", "2024-01-01T00:00:01Z"),
        ],
    );
    let (server, _) = test_server(&[a.clone()]);

    let body: Value = server
        .post("/api/logs/query")
        .json(&json!({ "tenant_id": "acme", "mode": "cursor" }))
        .await
        .json();
    let token = body["data"]["next_cursor"].as_str().unwrap().to_string();
    assert_eq!(
        body["data"]["next_cursor_after"],
        json!(["2024-01-01T00:00:01Z", "a1"])
    );

    server
        .post("/api/logs/query")
        .json(&json!({ "tenant_id": "acme", "mode": "cursor", "cursor": token }))
        .await
        .assert_status_ok();
    assert_eq!(
        a.last_body().unwrap()["search_after"],
        json!(["2024-01-01T00:00:01Z", "a1"])
    );
}

#[tokio::test]
async fn test_query_partial_failure_names_cluster() {
    let a = MockBackend::with_hits("a", 1, vec![hit("a1", "2024-01-01T00:00:01Z")]);
    let b = MockBackend::failing("b");
    let (server, _) = test_server(&[a, b]);

    let response = server
        .post("/api/logs/query")
        .json(&json!({ "tenant_id": "acme" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["unavailable"], json!(["b"]));
}

#[tokio::test]
async fn test_query_all_clusters_down() {
    let (server, _) = test_server(&[MockBackend::failing("a"), MockBackend::failing("b")]);

    let response = server
        .post("/api/logs/query")
        .json(&json!({ "tenant_id": "acme" }))
        .await;
    response.assert_status(StatusCode::BAD_GATEWAY);

    let body: Value = response.json();
    assert_envelope(&body, 2001, "error.es.connection");
    assert_eq!(body["data"], json!({}));
}

#[tokio::test]
async fn test_query_malformed_body() {
    let (server, _) = test_server(&[MockBackend::new("a")]);

    let response = server
        .post("/api/logs/query")
        .content_type("application/json")
        .text("{ not json")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_envelope(&response.json(), 3001, "error.input.bad");
}

// =============================================================================
// Stats
// =============================================================================

#[tokio::test]
async fn test_stats_merges_buckets() {
    let buckets = |entries: Value| {
        json!({
            "hits": { "total": { "value": 0 }, "hits": [] },
            "aggregations": { "group_stats": { "buckets": entries } }
        })
    };
    let a = MockBackend::new("a");
    a.set_response(buckets(json!([
        { "key": "api", "doc_count": 4 },
        { "key": "web", "doc_count": 1 }
    ])));
    let b = MockBackend::new("b");
    b.set_response(buckets(json!([{ "key": "web", "doc_count": 5 }])));
    let (server, _) = test_server(&[a.clone(), b]);

    let response = server
        .post("/api/logs/stats")
        .json(&json!({ "tenant_id": "acme", "group_by": "service" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_envelope(&body, 0, "info.stats.ok");
    assert_eq!(
        body["data"]["buckets"],
        json!([
            { "key": "web", "doc_count": 6 },
            { "key": "api", "doc_count": 4 }
        ])
    );
    assert_eq!(a.last_body().unwrap()["size"], 0);
}

#[tokio::test]
async fn test_stats_requires_group_by() {
    let (server, _) = test_server(&[MockBackend::new("a")]);

    let response = server
        .post("/api/logs/stats")
        .json(&json!({ "tenant_id": "acme" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_envelope(&response.json(), 3001, "error.input.bad");
}

// =============================================================================
// Pagination sessions
// =============================================================================

async fn open_session(server: &axum_test::TestServer, tenant: &str) -> Value {
    let response = server
        .post("/api/logs/paginate/init")
        .json(&json!({ "tenant_id": tenant, "pagination": { "page_size": 20 } }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_envelope(&body, 0, "info.query.ok");
    body["data"].clone()
}

#[tokio::test]
async fn test_paginate_init_and_get() {
    let a = MockBackend::new("a");
    a.set_response(search_response(45, vec![]));
    let (server, _) = test_server(&[a.clone()]);

    let init = open_session(&server, "acme").await;
    assert_eq!(init["total_items"], 45);
    assert_eq!(init["page_size"], 20);
    assert_eq!(init["total_pages"], 3);
    assert_eq!(a.last_body().unwrap()["size"], 0);

    a.set_response(search_response(45, vec![hit("x", "2024-01-01T00:00:00Z")]));
    let response = server
        .post("/api/logs/paginate/get")
        .json(&json!({ "session_id": init["session_id"], "page": 2, "tenant_id": "acme" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["data"]["current_page"], 2);
    assert_eq!(body["data"]["total_pages"], 3);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(a.last_body().unwrap()["from"], 20);
}

#[tokio::test]
async fn test_paginate_get_tenant_from_header() {
    let a = MockBackend::new("a");
    a.set_response(search_response(5, vec![]));
    let (server, _) = test_server(&[a]);

    let init = open_session(&server, "acme").await;
    server
        .post("/api/logs/paginate/get")
        .add_header(X_TENANT_ID, HeaderValue::from_static("acme"))
        .json(&json!({ "session_id": init["session_id"], "page": 1 }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_paginate_get_missing_params() {
    let (server, _) = test_server(&[MockBackend::new("a")]);

    for body in [
        json!({ "page": 1, "tenant_id": "acme" }),
        json!({ "session_id": "abc", "tenant_id": "acme" }),
        json!({ "session_id": "abc", "page": 1 }),
    ] {
        let response = server.post("/api/logs/paginate/get").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_envelope(&response.json(), 3002, "error.input.invalid_param");
    }
}

#[tokio::test]
async fn test_paginate_get_unknown_session() {
    let a = MockBackend::new("a");
    let (server, _) = test_server(&[a.clone()]);

    let response = server
        .post("/api/logs/paginate/get")
        .json(&json!({ "session_id": "missing", "page": 1, "tenant_id": "acme" }))
        .await;
    response.assert_status(StatusCode::GONE);
    assert_envelope(&response.json(), 3003, "error.pagination.session_expired");
    assert_eq!(a.search_calls(), 0);
}

#[tokio::test]
async fn test_paginate_get_other_tenant() {
    let a = MockBackend::new("a");
    a.set_response(search_response(5, vec![]));
    let (server, service) = test_server(&[a]);

    let init = open_session(&server, "acme").await;
    let response = server
        .post("/api/logs/paginate/get")
        .json(&json!({ "session_id": init["session_id"], "page": 1, "tenant_id": "globex" }))
        .await;
    response.assert_status(StatusCode::GONE);
    assert_envelope(&response.json(), 3003, "error.pagination.session_expired");

    assert_eq!(service.sessions().len(), 1);
}

#[tokio::test]
async fn test_paginate_get_out_of_range() {
    let a = MockBackend::new("a");
    a.set_response(search_response(45, vec![]));
    let (server, _) = test_server(&[a.clone()]);

    let init = open_session(&server, "acme").await;
    let calls = a.search_calls();

    for page in [0, 4] {
        let response = server
            .post("/api/logs/paginate/get")
            .json(&json!({ "session_id": init["session_id"], "page": page, "tenant_id": "acme" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_envelope(&response.json(), 3004, "error.pagination.invalid_page");
    }
    assert_eq!(a.search_calls(), calls);
}

// =============================================================================
// Indices
// =============================================================================

#[tokio::test]
async fn test_indices_refresh_and_list() {
    let a = MockBackend::new("a");
    a.set_catalog(&["logs-b", "logs-a"]);
    let b = MockBackend::new("b");
    b.set_catalog(&["logs-a", "metrics-1"]);
    let (server, _) = test_server(&[a, b]);

    let body: Value = server.get("/api/indices/list").await.json();
    assert_envelope(&body, 0, "info.indices.ok");
    assert_eq!(body["data"]["items"], json!([]));

    let response = server.post("/api/indices/refresh").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_envelope(&body, 0, "info.indices.refresh.ok");
    assert_eq!(body["data"]["items"], json!(["logs-a", "logs-b", "metrics-1"]));
    assert_eq!(body["data"]["status"]["indexCount"], 3);
    assert_eq!(body["data"]["status"]["lastAdded"], 3);

    let body: Value = server.get("/api/indices/list").await.json();
    assert_eq!(body["data"]["items"], json!(["logs-a", "logs-b", "metrics-1"]));
}

#[tokio::test]
async fn test_indices_config_update() {
    let a = MockBackend::new("a");
    a.set_catalog(&["logs-a", "metrics-1"]);
    let (server, service) = test_server(&[a]);

    let response = server
        .post("/api/indices/config")
        .json(&json!({ "interval_seconds": 30, "include_patterns": ["^logs-"] }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_envelope(&body, 0, "info.indices.config.ok");
    assert_eq!(body["data"]["status"]["intervalSeconds"], 30);
    assert_eq!(body["data"]["status"]["enabled"], false);

    let body: Value = server.post("/api/indices/refresh").await.json();
    assert_eq!(body["data"]["items"], json!(["logs-a"]));
    assert_eq!(service.catalog().config().include_patterns, vec!["^logs-"]);
}

#[tokio::test]
async fn test_indices_config_rejects_interval_out_of_range() {
    let (server, service) = test_server(&[MockBackend::new("a")]);
    let before = service.catalog().config();

    for interval in [4, 3601] {
        let response = server
            .post("/api/indices/config")
            .json(&json!({ "interval_seconds": interval }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_envelope(&response.json(), 3001, "error.indices.bad_config");
    }

    assert_eq!(service.catalog().config(), before);
}

#[tokio::test]
async fn test_indices_config_rejects_invalid_pattern() {
    let (server, service) = test_server(&[MockBackend::new("a")]);
    let before = service.catalog().config();

    let response = server
        .post("/api/indices/config")
        .json(&json!({ "interval_seconds": 30, "exclude_patterns": ["(unclosed"] }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_envelope(&response.json(), 3001, "error.indices.bad_config");

    assert_eq!(service.catalog().config(), before);
}

// =============================================================================
// Index resolution through the API
// =============================================================================

#[tokio::test]
async fn test_query_uses_default_indices_from_config() {
    let a = MockBackend::new("a");
    let config = ServerConfig {
        log_indexes: vec!["app-*".to_string()],
        ..ServerConfig::for_testing()
    };
    let (server, service) = test_server_with_config(&[a], config);

    server
        .post("/api/logs/query")
        .json(&json!({ "tenant_id": "acme" }))
        .await
        .assert_status_ok();

    let resolved = service.resolve_indices(&Default::default());
    assert_eq!(resolved, vec!["app-*"]);
}
