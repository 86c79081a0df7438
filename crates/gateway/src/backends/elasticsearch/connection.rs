//! Connection to one Elasticsearch-compatible cluster.

use std::fmt::Debug;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use elasticsearch::Elasticsearch;
use elasticsearch::auth::Credentials;
use elasticsearch::cat::CatIndicesParts;
use elasticsearch::cert::CertificateValidation;
use elasticsearch::http::Method;
use elasticsearch::http::headers::HeaderMap;
use elasticsearch::http::request::JsonBody;
use elasticsearch::http::response::Response;
use elasticsearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::core::SearchBackend;
use crate::error::{BackendError, BackendResult};

use super::config::{ClusterEndpoint, DEFAULT_REQUEST_TIMEOUT_MS};
use super::version::{DEFAULT_VERSION_NUMBER, DetectedVersion};

/// A connection to one cluster endpoint.
///
/// The HTTP transport is built on first use and then reused, so every call
/// shares the client's keep-alive pool. The server version is probed at most
/// once and cached for the lifetime of the connection.
pub struct ClusterConnection {
    endpoint: ClusterEndpoint,
    timeout: Duration,
    client: OnceLock<Elasticsearch>,
    version: OnceCell<DetectedVersion>,
}

impl Debug for ClusterConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterConnection")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("version", &self.version.get())
            .finish_non_exhaustive()
    }
}

impl ClusterConnection {
    /// Creates a connection with the default 5 second per-call timeout.
    pub fn new(endpoint: ClusterEndpoint) -> Self {
        Self::with_timeout(endpoint, Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS))
    }

    /// Creates a connection with a custom per-call timeout.
    pub fn with_timeout(endpoint: ClusterEndpoint, timeout: Duration) -> Self {
        Self {
            endpoint,
            timeout,
            client: OnceLock::new(),
            version: OnceCell::new(),
        }
    }

    /// Returns the endpoint.
    pub fn endpoint(&self) -> &ClusterEndpoint {
        &self.endpoint
    }

    /// Returns the client, building the transport on first use.
    fn client(&self) -> BackendResult<&Elasticsearch> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = self.build_client()?;
        Ok(self.client.get_or_init(|| client))
    }

    fn build_client(&self) -> BackendResult<Elasticsearch> {
        let conn_pool = SingleNodeConnectionPool::new(self.endpoint.parsed_url()?);

        let mut builder = TransportBuilder::new(conn_pool).timeout(self.timeout);

        if !self.endpoint.verify_tls() {
            builder = builder.cert_validation(CertificateValidation::None);
        }

        if let Some((username, password)) = self.endpoint.credentials() {
            builder = builder.auth(Credentials::Basic(
                username.to_string(),
                password.to_string(),
            ));
        }

        let transport = builder.build().map_err(|e| BackendError::InvalidEndpoint {
            url: self.endpoint.url().to_string(),
            message: format!("failed to build transport: {}", e),
        })?;

        Ok(Elasticsearch::new(transport))
    }

    fn unavailable(&self, message: impl Into<String>) -> BackendError {
        BackendError::Unavailable {
            cluster: self.endpoint.url().to_string(),
            message: message.into(),
        }
    }

    fn decode_error(&self, message: impl Into<String>) -> BackendError {
        BackendError::Decode {
            cluster: self.endpoint.url().to_string(),
            message: message.into(),
        }
    }

    /// Fails with `Unavailable` on a non-2xx response, else decodes the body.
    async fn read_json(&self, response: Response, operation: &str) -> BackendResult<Value> {
        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.unavailable(format!("{} returned status {}: {}", operation, status, body)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| self.decode_error(format!("failed to parse {} response: {}", operation, e)))
    }

    /// Returns the cluster's major version, probing the root endpoint at most
    /// once.
    ///
    /// Never fails: if the probe fails the fallback version is cached instead.
    pub async fn detect_version(&self) -> DetectedVersion {
        *self
            .version
            .get_or_init(|| async {
                match self.probe_version().await {
                    Ok(version) => {
                        debug!(cluster = %self.endpoint.url(), major = version.major(), "detected cluster version");
                        version
                    }
                    Err(e) => {
                        warn!(
                            cluster = %self.endpoint.url(),
                            error = %e,
                            "version detection failed, assuming legacy cluster"
                        );
                        DetectedVersion::fallback()
                    }
                }
            })
            .await
    }

    async fn probe_version(&self) -> BackendResult<DetectedVersion> {
        let response = self
            .client()?
            .info()
            .send()
            .await
            .map_err(|e| self.unavailable(format!("version probe failed: {}", e)))?;

        let body = self.read_json(response, "version probe").await?;
        let number = body
            .pointer("/version/number")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_VERSION_NUMBER);

        DetectedVersion::parse(number)
            .ok_or_else(|| self.decode_error(format!("unparsable version number '{}'", number)))
    }

    /// Returns the path a search against `indices` is submitted to.
    pub async fn search_path(&self, indices: &[String], doc_type: Option<&str>) -> String {
        self.detect_version().await.search_path(indices, doc_type)
    }

    /// Returns the path of a single document.
    pub async fn document_path(&self, index: &str, doc_id: &str, doc_type: Option<&str>) -> String {
        self.detect_version()
            .await
            .document_path(index, doc_id, doc_type)
    }

    /// Fetches one document by id. Returns `None` when it does not exist.
    pub async fn get_document(
        &self,
        index: &str,
        doc_id: &str,
        doc_type: Option<&str>,
    ) -> BackendResult<Option<Value>> {
        let path = self.document_path(index, doc_id, doc_type).await;
        let response = self
            .client()?
            .send(
                Method::Get,
                &path,
                HeaderMap::new(),
                None::<&()>,
                None::<JsonBody<Value>>,
                None,
            )
            .await
            .map_err(|e| self.unavailable(format!("document fetch failed: {}", e)))?;

        if response.status_code().as_u16() == 404 {
            return Ok(None);
        }

        self.read_json(response, "document fetch").await.map(Some)
    }
}

#[async_trait]
impl SearchBackend for ClusterConnection {
    fn name(&self) -> &str {
        self.endpoint.url()
    }

    async fn execute_search(
        &self,
        indices: &[String],
        body: &Value,
        doc_type: Option<&str>,
    ) -> BackendResult<Value> {
        let path = self.search_path(indices, doc_type).await;
        let response = self
            .client()?
            .send(
                Method::Post,
                &path,
                HeaderMap::new(),
                None::<&()>,
                Some(JsonBody::new(body)),
                None,
            )
            .await
            .map_err(|e| self.unavailable(format!("search failed: {}", e)))?;

        self.read_json(response, "search").await
    }

    async fn fetch_catalog(&self) -> BackendResult<Vec<String>> {
        let response = self
            .client()?
            .cat()
            .indices(CatIndicesParts::None)
            .h(&["index"])
            .s(&["index"])
            .format("json")
            .send()
            .await
            .map_err(|e| self.unavailable(format!("index listing failed: {}", e)))?;

        let body = self.read_json(response, "index listing").await?;
        let rows = body
            .as_array()
            .ok_or_else(|| self.decode_error("index listing is not an array"))?;

        Ok(rows
            .iter()
            .filter_map(|row| row.get("index").and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }
}
