//! Index catalog configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default include pattern.
pub const DEFAULT_INCLUDE_PATTERN: &str = r"^kst-logs-[A-Za-z0-9_-].*";

/// Default refresh interval in seconds.
pub const DEFAULT_INTERVAL_SECONDS: u64 = 60;

/// Runtime configuration of the index catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Whether the background loop refreshes (default: true).
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Seconds between refreshes (default: 60).
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,

    /// Regexes of which at least one must match, if any are given.
    #[serde(default = "default_include_patterns")]
    pub include_patterns: Vec<String>,

    /// Regexes of which none may match.
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_interval_seconds() -> u64 {
    DEFAULT_INTERVAL_SECONDS
}

fn default_include_patterns() -> Vec<String> {
    vec![DEFAULT_INCLUDE_PATTERN.to_string()]
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_seconds: default_interval_seconds(),
            include_patterns: default_include_patterns(),
            exclude_patterns: Vec::new(),
        }
    }
}

impl CatalogConfig {
    /// Returns the refresh interval.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    /// Returns a copy with the update applied, without validating patterns.
    ///
    /// A zero interval is ignored.
    pub fn merged(&self, update: &CatalogConfigUpdate) -> Self {
        let mut next = self.clone();
        if let Some(enabled) = update.enabled {
            next.enabled = enabled;
        }
        if let Some(interval) = update.interval_seconds.filter(|i| *i > 0) {
            next.interval_seconds = interval;
        }
        if let Some(include) = &update.include_patterns {
            next.include_patterns = include.clone();
        }
        if let Some(exclude) = &update.exclude_patterns {
            next.exclude_patterns = exclude.clone();
        }
        next
    }
}

/// A partial configuration change. Absent fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfigUpdate {
    /// New enabled flag.
    #[serde(default)]
    pub enabled: Option<bool>,
    /// New interval; ignored unless strictly positive.
    #[serde(default)]
    pub interval_seconds: Option<u64>,
    /// Replacement include patterns.
    #[serde(default)]
    pub include_patterns: Option<Vec<String>>,
    /// Replacement exclude patterns.
    #[serde(default)]
    pub exclude_patterns: Option<Vec<String>>,
}
