//! Server configuration.
//!
//! Every option can be given as a command-line flag or a `KESTREL_*`
//! environment variable. List options take comma-separated values, except
//! the index patterns, which are regexes and take `;`-separated values so a
//! counted repetition such as `\d{2,3}` stays whole.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `KESTREL_PORT` | 8080 | Server port |
//! | `KESTREL_HOST` | 127.0.0.1 | Host to bind |
//! | `KESTREL_LOG_LEVEL` | info | Log level |
//! | `KESTREL_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `KESTREL_ENABLE_CORS` | true | Enable CORS |
//! | `KESTREL_CORS_ORIGINS` | * | Allowed origins |
//! | `KESTREL_ES_HOSTS` | http://localhost:9200 | Cluster URLs |
//! | `KESTREL_ES_USERNAME` | | Basic-auth user |
//! | `KESTREL_ES_PASSWORD` | | Basic-auth password |
//! | `KESTREL_ES_VERIFY_TLS` | true | Verify server certificates |
//! | `KESTREL_ES_TIMEOUT_MS` | 5000 | Per-call cluster timeout |
//! | `KESTREL_TIMESTAMP_FIELD` | timestamp | Primary timestamp field |
//! | `KESTREL_LOG_INDEXES` | logs-* | Default indices |
//! | `KESTREL_DOC_TYPE` | | Legacy document type |
//! | `KESTREL_MAX_PAGE_SIZE` | 20 | Maximum page size (1..=200) |
//! | `KESTREL_DISCOVERY_ENABLED` | true | Background index discovery |
//! | `KESTREL_DISCOVERY_INTERVAL` | 60 | Discovery interval (seconds) |
//! | `KESTREL_INCLUDE_PATTERNS` | `^kst-logs-[A-Za-z0-9_-].*` | Index include regexes (`;`-separated) |
//! | `KESTREL_EXCLUDE_PATTERNS` | | Index exclude regexes (`;`-separated) |
//! | `KESTREL_SESSION_TTL` | 3600 | Pagination session lifetime (seconds) |
//! | `KESTREL_DEBUG_QUERY_LOGS` | false | Log every dispatched query body |

use std::time::Duration;

use clap::{ArgAction, Parser};
use kestrel_gateway::backends::elasticsearch::{ClusterConfig, DEFAULT_REQUEST_TIMEOUT_MS};
use kestrel_gateway::catalog::{
    CatalogConfig, DEFAULT_INCLUDE_PATTERN, DEFAULT_INTERVAL_SECONDS, IndexPatterns,
};
use kestrel_gateway::pagination::{DEFAULT_SESSION_TTL, SessionConfig};
use kestrel_gateway::query::AdapterConfig;
use kestrel_gateway::service::{ServiceConfig, is_index_expression};

/// Separator of the index pattern lists.
pub const PATTERN_DELIMITER: char = ';';

/// Server configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "kestrel")]
#[command(about = "Federated log-query gateway for Elasticsearch clusters")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "KESTREL_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "KESTREL_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "KESTREL_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Request timeout in seconds.
    #[arg(long, env = "KESTREL_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "KESTREL_ENABLE_CORS", default_value = "true", action = ArgAction::Set)]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "KESTREL_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Allowed CORS methods (comma-separated, or * for all).
    #[arg(long, env = "KESTREL_CORS_METHODS", default_value = "GET,POST,OPTIONS")]
    pub cors_methods: String,

    /// Allowed CORS headers (comma-separated, or * for all).
    #[arg(
        long,
        env = "KESTREL_CORS_HEADERS",
        default_value = "Content-Type,Authorization,Accept,X-Tenant-ID"
    )]
    pub cors_headers: String,

    /// Cluster base URLs.
    #[arg(
        long,
        env = "KESTREL_ES_HOSTS",
        value_delimiter = ',',
        default_value = "http://localhost:9200"
    )]
    pub es_hosts: Vec<String>,

    /// Basic-auth username for every cluster.
    #[arg(long, env = "KESTREL_ES_USERNAME")]
    pub es_username: Option<String>,

    /// Basic-auth password for every cluster.
    #[arg(long, env = "KESTREL_ES_PASSWORD", hide_env_values = true)]
    pub es_password: Option<String>,

    /// Verify cluster certificates.
    #[arg(long, env = "KESTREL_ES_VERIFY_TLS", default_value = "true", action = ArgAction::Set)]
    pub es_verify_tls: bool,

    /// Per-call cluster timeout in milliseconds.
    #[arg(long, env = "KESTREL_ES_TIMEOUT_MS", default_value_t = DEFAULT_REQUEST_TIMEOUT_MS)]
    pub es_timeout_ms: u64,

    /// Primary timestamp field.
    #[arg(long, env = "KESTREL_TIMESTAMP_FIELD", default_value = "timestamp")]
    pub timestamp_field: String,

    /// Indices searched when a request names none.
    #[arg(
        long,
        env = "KESTREL_LOG_INDEXES",
        value_delimiter = ',',
        default_value = "logs-*"
    )]
    pub log_indexes: Vec<String>,

    /// Document type used against clusters at or below 6.x.
    #[arg(long, env = "KESTREL_DOC_TYPE")]
    pub doc_type: Option<String>,

    /// Maximum page size (1..=200).
    #[arg(long, env = "KESTREL_MAX_PAGE_SIZE", default_value = "20")]
    pub max_page_size: u32,

    /// Run background index discovery.
    #[arg(long, env = "KESTREL_DISCOVERY_ENABLED", default_value = "true", action = ArgAction::Set)]
    pub discovery_enabled: bool,

    /// Seconds between discovery refreshes.
    #[arg(long, env = "KESTREL_DISCOVERY_INTERVAL", default_value_t = DEFAULT_INTERVAL_SECONDS)]
    pub discovery_interval: u64,

    /// Index include regexes (`;`-separated).
    #[arg(
        long,
        env = "KESTREL_INCLUDE_PATTERNS",
        value_delimiter = PATTERN_DELIMITER,
        default_value = DEFAULT_INCLUDE_PATTERN
    )]
    pub include_patterns: Vec<String>,

    /// Index exclude regexes (`;`-separated).
    #[arg(long, env = "KESTREL_EXCLUDE_PATTERNS", value_delimiter = PATTERN_DELIMITER)]
    pub exclude_patterns: Vec<String>,

    /// Pagination session lifetime in seconds.
    #[arg(long, env = "KESTREL_SESSION_TTL", default_value = "3600")]
    pub session_ttl: u64,

    /// Log every dispatched query body at debug level.
    #[arg(long, env = "KESTREL_DEBUG_QUERY_LOGS", default_value = "false", action = ArgAction::Set)]
    pub debug_query_logs: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            cors_methods: "GET,POST,OPTIONS".to_string(),
            cors_headers: "Content-Type,Authorization,Accept,X-Tenant-ID".to_string(),
            es_hosts: vec!["http://localhost:9200".to_string()],
            es_username: None,
            es_password: None,
            es_verify_tls: true,
            es_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            timestamp_field: "timestamp".to_string(),
            log_indexes: vec!["logs-*".to_string()],
            doc_type: None,
            max_page_size: 20,
            discovery_enabled: true,
            discovery_interval: DEFAULT_INTERVAL_SECONDS,
            include_patterns: vec![DEFAULT_INCLUDE_PATTERN.to_string()],
            exclude_patterns: Vec::new(),
            session_ttl: DEFAULT_SESSION_TTL.as_secs(),
            debug_query_logs: false,
        }
    }
}

impl ServerConfig {
    /// Parses configuration from the environment only, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        Self::try_parse_from(["kestrel"]).unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validates the configuration and returns every problem found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.es_hosts.iter().all(|h| h.trim().is_empty()) {
            errors.push("At least one Elasticsearch host is required".to_string());
        }

        if self.es_timeout_ms == 0 {
            errors.push("Elasticsearch timeout cannot be 0".to_string());
        }

        if self.timestamp_field.trim().is_empty() {
            errors.push("Timestamp field cannot be empty".to_string());
        }

        if let Err(e) = self.adapter_config().validate() {
            errors.push(e.to_string());
        }

        let invalid_indices: Vec<&str> = self
            .log_indexes
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty() && !is_index_expression(name))
            .collect();
        if !invalid_indices.is_empty() {
            errors.push(format!("Invalid default log indices: {:?}", invalid_indices));
        }

        if self.discovery_interval == 0 {
            errors.push("Discovery interval cannot be 0".to_string());
        }

        if let Err(e) = IndexPatterns::compile(&self.include_patterns, &self.exclude_patterns) {
            errors.push(e.to_string());
        }

        if self.session_ttl == 0 {
            errors.push("Session TTL cannot be 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    pub fn for_testing() -> Self {
        Self {
            port: 0,
            log_level: "debug".to_string(),
            request_timeout: 5,
            enable_cors: false,
            cors_methods: "*".to_string(),
            cors_headers: "*".to_string(),
            es_timeout_ms: 500,
            discovery_enabled: false,
            include_patterns: Vec::new(),
            ..Default::default()
        }
    }

    /// Cluster connection settings.
    pub fn cluster_config(&self) -> ClusterConfig {
        ClusterConfig {
            hosts: self.es_hosts.clone(),
            username: self.es_username.clone(),
            password: self.es_password.clone(),
            verify_tls: self.es_verify_tls,
            request_timeout_ms: self.es_timeout_ms,
        }
    }

    /// Query adapter settings.
    pub fn adapter_config(&self) -> AdapterConfig {
        AdapterConfig {
            timestamp_field: self.timestamp_field.clone(),
            max_page_size: self.max_page_size,
        }
    }

    /// Index catalog settings.
    pub fn catalog_config(&self) -> CatalogConfig {
        CatalogConfig {
            enabled: self.discovery_enabled,
            interval_seconds: self.discovery_interval,
            include_patterns: non_blank(&self.include_patterns),
            exclude_patterns: non_blank(&self.exclude_patterns),
        }
    }

    /// Pagination session settings.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            ttl: Duration::from_secs(self.session_ttl),
        }
    }

    /// Log search service settings.
    pub fn service_config(&self) -> ServiceConfig {
        let default_indices = non_blank(&self.log_indexes);
        ServiceConfig {
            default_indices: if default_indices.is_empty() {
                ServiceConfig::default().default_indices
            } else {
                default_indices
            },
            doc_type: self.doc_type.clone().filter(|t| !t.trim().is_empty()),
        }
    }
}

fn non_blank(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_page_size, 20);
        assert_eq!(config.log_indexes, vec!["logs-*"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_flags() {
        let config = ServerConfig::try_parse_from([
            "kestrel",
            "--es-hosts",
            "http://a:9200,http://b:9200",
            "--max-page-size",
            "50",
            "--enable-cors",
            "false",
            "--exclude-patterns=-archive$;^\\.",
        ])
        .unwrap();
        assert_eq!(config.es_hosts, vec!["http://a:9200", "http://b:9200"]);
        assert_eq!(config.max_page_size, 50);
        assert!(!config.enable_cors);
        assert_eq!(config.exclude_patterns, vec!["-archive$", "^\\."]);
        assert_eq!(config.include_patterns, vec![DEFAULT_INCLUDE_PATTERN]);
    }

    #[test]
    fn test_patterns_keep_counted_repetition() {
        let config = ServerConfig::try_parse_from([
            "kestrel",
            "--include-patterns",
            "^kst-logs-\\d{2,3}$;^audit-",
            "--exclude-patterns=-v{1,2}$",
        ])
        .unwrap();
        assert_eq!(config.include_patterns, vec!["^kst-logs-\\d{2,3}$", "^audit-"]);
        assert_eq!(config.exclude_patterns, vec!["-v{1,2}$"]);
        assert!(config.validate().is_ok());

        let patterns =
            IndexPatterns::compile(&config.include_patterns, &config.exclude_patterns).unwrap();
        assert!(patterns.is_valid("kst-logs-123"));
        assert!(!patterns.is_valid("kst-logs-1"));
    }

    #[test]
    fn test_validate_rejects_path_breaking_default_indices() {
        let config = ServerConfig {
            log_indexes: vec!["logs-*".to_string(), "logs/_doc/1#".to_string()],
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("logs/_doc/1#"));
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let config = ServerConfig {
            request_timeout: 0,
            max_page_size: 500,
            exclude_patterns: vec!["(".to_string()],
            es_hosts: vec![" ".to_string()],
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().any(|e| e.contains("max_page_size")));
    }

    #[test]
    fn test_component_configs() {
        let config = ServerConfig {
            log_indexes: vec![" ".to_string()],
            doc_type: Some("log".to_string()),
            session_ttl: 60,
            ..Default::default()
        };
        assert_eq!(config.service_config().default_indices, vec!["logs-*"]);
        assert_eq!(config.service_config().doc_type.as_deref(), Some("log"));
        assert_eq!(config.session_config().ttl, Duration::from_secs(60));
        assert_eq!(config.adapter_config().max_page_size, 20);
        assert!(config.catalog_config().enabled);
    }

    #[test]
    fn test_for_testing() {
        let config = ServerConfig::for_testing();
        assert_eq!(config.port, 0);
        assert!(!config.catalog_config().enabled);
        assert!(config.validate().is_ok());
    }
}
