//! Cluster endpoint configuration.

use std::fmt;

use elasticsearch::http::Url;
use serde::{Deserialize, Serialize};

use crate::error::{BackendError, BackendResult, ConfigError};

/// Default per-call timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5000;

/// One cluster's base URL and connection profile. Immutable once built.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterEndpoint {
    url: String,
    username: Option<String>,
    password: Option<String>,
    verify_tls: bool,
}

impl ClusterEndpoint {
    /// Creates an endpoint from a base URL, trimming trailing slashes.
    ///
    /// Fails with [`BackendError::InvalidEndpoint`] if the URL does not parse.
    pub fn from_url(url: impl AsRef<str>) -> BackendResult<Self> {
        let trimmed = url.as_ref().trim().trim_end_matches('/');
        trimmed
            .parse::<Url>()
            .map_err(|e| BackendError::InvalidEndpoint {
                url: trimmed.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            url: trimmed.to_string(),
            username: None,
            password: None,
            verify_tls: true,
        })
    }

    /// Sets basic-auth credentials.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets whether server certificates are verified.
    pub fn with_verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = verify_tls;
        self
    }

    /// Returns the base URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the base URL parsed.
    pub fn parsed_url(&self) -> BackendResult<Url> {
        self.url
            .parse::<Url>()
            .map_err(|e| BackendError::InvalidEndpoint {
                url: self.url.clone(),
                message: e.to_string(),
            })
    }

    /// Returns the credentials when both username and password are non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }

    /// Returns true if server certificates are verified.
    pub fn verify_tls(&self) -> bool {
        self.verify_tls
    }
}

impl fmt::Debug for ClusterEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterEndpoint")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}

/// Connection settings shared by every configured cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Cluster base URLs.
    pub hosts: Vec<String>,

    /// Basic-auth username, applied to every cluster.
    #[serde(default)]
    pub username: Option<String>,

    /// Basic-auth password, applied to every cluster.
    #[serde(default)]
    pub password: Option<String>,

    /// Verify server certificates (default: true).
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,

    /// Per-call timeout in milliseconds (default: 5000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_verify_tls() -> bool {
    true
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            hosts: vec!["http://localhost:9200".to_string()],
            username: None,
            password: None,
            verify_tls: default_verify_tls(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ClusterConfig {
    /// Builds one endpoint per non-blank host.
    pub fn endpoints(&self) -> Result<Vec<ClusterEndpoint>, crate::error::GatewayError> {
        let mut endpoints = Vec::with_capacity(self.hosts.len());
        for host in self.hosts.iter().filter(|h| !h.trim().is_empty()) {
            let mut endpoint = ClusterEndpoint::from_url(host)?.with_verify_tls(self.verify_tls);
            if let (Some(user), Some(pass)) = (&self.username, &self.password) {
                endpoint = endpoint.with_credentials(user, pass);
            }
            endpoints.push(endpoint);
        }

        if endpoints.is_empty() {
            return Err(ConfigError::NoClusters.into());
        }
        Ok(endpoints)
    }
}
