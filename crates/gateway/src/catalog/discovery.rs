//! Background index discovery.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::core::DynBackend;
use crate::error::CatalogError;
use crate::observability::DynObserver;

use super::config::{CatalogConfig, CatalogConfigUpdate};
use super::matcher::{IndexPatterns, find_matches};

/// Granularity at which the refresh loop checks for shutdown while sleeping.
pub const SLEEP_STEP: Duration = Duration::from_secs(1);

/// How long `shutdown` waits for the loop to exit before aborting it.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// The result of one completed refresh cycle.
#[derive(Debug, Clone, Default)]
struct CatalogSnapshot {
    indices: BTreeSet<String>,
    refreshed_at: Option<DateTime<Utc>>,
    added: usize,
    removed: usize,
}

/// Configuration together with its compiled patterns.
#[derive(Debug, Clone)]
struct CatalogSettings {
    config: CatalogConfig,
    patterns: Arc<IndexPatterns>,
}

impl CatalogSettings {
    fn compile(config: CatalogConfig) -> Result<Self, CatalogError> {
        let patterns = IndexPatterns::compile(&config.include_patterns, &config.exclude_patterns)?;
        Ok(Self {
            config,
            patterns: Arc::new(patterns),
        })
    }
}

/// Catalog state reported to administrators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStatus {
    /// Completion time of the last refresh, if any.
    pub last_refresh_timestamp: Option<DateTime<Utc>>,
    /// Whether the background loop refreshes.
    pub enabled: bool,
    /// Seconds between refreshes.
    pub interval_seconds: u64,
    /// Number of indices in the catalog.
    pub index_count: usize,
    /// Indices added by the last refresh.
    pub last_added: usize,
    /// Indices removed by the last refresh.
    pub last_removed: usize,
}

struct CatalogInner {
    backends: Vec<DynBackend>,
    settings: RwLock<CatalogSettings>,
    snapshot: RwLock<Arc<CatalogSnapshot>>,
    refresh_lock: tokio::sync::Mutex<()>,
    observer: DynObserver,
}

struct LoopHandle {
    shutdown_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

/// The set of valid index names, kept current by a background loop.
///
/// Each refresh asks every cluster for its index names concurrently, keeps
/// the names that pass the include/exclude rules, and swaps the new set in
/// as a whole. Readers see either the previous set or the new one, never a
/// mix. A cluster that fails contributes nothing to that cycle.
///
/// # Example
///
/// ```ignore
/// use kestrel_gateway::catalog::{CatalogConfig, IndexCatalog};
///
/// let catalog = IndexCatalog::new(backends, CatalogConfig::default(), observer)?;
/// catalog.startup();
///
/// let prod = catalog.find_indices("prod", false, true);
///
/// catalog.shutdown().await;
/// ```
pub struct IndexCatalog {
    inner: Arc<CatalogInner>,
    task: Mutex<Option<LoopHandle>>,
}

impl std::fmt::Debug for IndexCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexCatalog")
            .field("clusters", &self.inner.backends.len())
            .field("config", &self.inner.settings.read().config)
            .field("index_count", &self.inner.snapshot.read().indices.len())
            .field("running", &self.is_running())
            .finish()
    }
}

impl IndexCatalog {
    /// Creates a catalog. Fails if a configured pattern is not a valid regex.
    ///
    /// The catalog starts empty; nothing is fetched until [`startup`] or
    /// [`refresh_once`] is called.
    ///
    /// [`startup`]: IndexCatalog::startup
    /// [`refresh_once`]: IndexCatalog::refresh_once
    pub fn new(
        backends: Vec<DynBackend>,
        config: CatalogConfig,
        observer: DynObserver,
    ) -> Result<Self, CatalogError> {
        let settings = CatalogSettings::compile(config)?;
        Ok(Self {
            inner: Arc::new(CatalogInner {
                backends,
                settings: RwLock::new(settings),
                snapshot: RwLock::new(Arc::new(CatalogSnapshot::default())),
                refresh_lock: tokio::sync::Mutex::new(()),
                observer,
            }),
            task: Mutex::new(None),
        })
    }

    /// Starts the background loop. Does nothing if it is already running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn startup(&self) {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|t| !t.handle.is_finished()) {
            return;
        }

        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let inner = self.inner.clone();
        let handle = tokio::spawn(async move {
            inner.run_loop(shutdown_rx).await;
        });
        *task = Some(LoopHandle {
            shutdown_tx,
            handle,
        });
        info!("catalog started");
    }

    /// Stops the background loop and waits for it to exit.
    ///
    /// Interrupts a sleep or an in-flight refresh; returns within
    /// [`SHUTDOWN_TIMEOUT`] even if the loop does not cooperate.
    pub async fn shutdown(&self) {
        let task = self.task.lock().take();
        let Some(LoopHandle {
            shutdown_tx,
            mut handle,
        }) = task
        else {
            return;
        };

        let _ = shutdown_tx.send(()).await;
        match tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "catalog loop ended abnormally"),
            Err(_) => {
                warn!("catalog loop did not stop in time, aborting");
                handle.abort();
            }
        }
        info!("catalog stopped");
    }

    /// Returns true while the background loop is running.
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished())
    }

    /// Runs one refresh cycle now and returns the resulting status.
    ///
    /// Concurrent calls are serialised.
    pub async fn refresh_once(&self) -> CatalogStatus {
        self.inner.refresh_once().await;
        self.status()
    }

    /// Applies a partial configuration change.
    ///
    /// Patterns are compiled first; if any is invalid nothing changes.
    pub fn update_config(&self, update: &CatalogConfigUpdate) -> Result<CatalogConfig, CatalogError> {
        let mut settings = self.inner.settings.write();
        let next = CatalogSettings::compile(settings.config.merged(update))?;
        *settings = next;
        info!(
            enabled = settings.config.enabled,
            interval_seconds = settings.config.interval_seconds,
            include = settings.config.include_patterns.len(),
            exclude = settings.config.exclude_patterns.len(),
            "catalog configuration updated"
        );
        Ok(settings.config.clone())
    }

    /// Returns the current configuration.
    pub fn config(&self) -> CatalogConfig {
        self.inner.settings.read().config.clone()
    }

    /// Returns the catalog, sorted.
    pub fn indices(&self) -> Vec<String> {
        self.inner.snapshot().indices.iter().cloned().collect()
    }

    /// Returns the current status.
    pub fn status(&self) -> CatalogStatus {
        let snapshot = self.inner.snapshot();
        let settings = self.inner.settings.read();
        CatalogStatus {
            last_refresh_timestamp: snapshot.refreshed_at,
            enabled: settings.config.enabled,
            interval_seconds: settings.config.interval_seconds,
            index_count: snapshot.indices.len(),
            last_added: snapshot.added,
            last_removed: snapshot.removed,
        }
    }

    /// Returns true if the name passes the current include/exclude rules.
    pub fn is_valid(&self, name: &str) -> bool {
        self.inner.settings.read().patterns.is_valid(name)
    }

    /// Looks up a keyword in the catalog.
    ///
    /// See [`find_matches`] for the matching rules. An invalid regex keyword
    /// is logged and matches nothing.
    pub fn find_indices(&self, keyword: &str, use_regex: bool, fuzzy: bool) -> Vec<String> {
        let snapshot = self.inner.snapshot();
        if keyword.is_empty() {
            return snapshot.indices.iter().cloned().collect();
        }

        let matches = match find_matches(&snapshot.indices, keyword, use_regex, fuzzy) {
            Ok(matches) => matches,
            Err(e) => {
                warn!(keyword, error = %e, "invalid index keyword pattern");
                Vec::new()
            }
        };

        let ratio = matches.len() as f64 / snapshot.indices.len().max(1) as f64;
        self.inner.observer.catalog_matched(ratio);
        info!(keyword, matches = matches.len(), "index match");
        matches
    }
}

impl CatalogInner {
    fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.snapshot.read().clone()
    }

    fn is_enabled(&self) -> bool {
        self.settings.read().config.enabled
    }

    fn interval_seconds(&self) -> u64 {
        self.settings.read().config.interval_seconds
    }

    async fn run_loop(&self, mut shutdown_rx: mpsc::Receiver<()>) {
        loop {
            if self.is_enabled() {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    _ = self.refresh_once() => {}
                }
            }

            let mut remaining = self.interval_seconds().max(1);
            while remaining > 0 {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        debug!("catalog loop shutting down");
                        return;
                    }
                    _ = tokio::time::sleep(SLEEP_STEP) => {}
                }
                remaining -= 1;
            }
        }
        debug!("catalog loop shutting down");
    }

    async fn refresh_once(&self) {
        let _guard = self.refresh_lock.lock().await;

        let fetched = self.fetch_all().await;
        let patterns = self.settings.read().patterns.clone();
        let discovered: BTreeSet<String> = fetched
            .into_iter()
            .flatten()
            .filter(|name| patterns.is_valid(name))
            .collect();

        let previous = self.snapshot();
        let added = discovered.difference(&previous.indices).count();
        let removed = previous.indices.difference(&discovered).count();
        let count = discovered.len();

        *self.snapshot.write() = Arc::new(CatalogSnapshot {
            indices: discovered,
            refreshed_at: Some(Utc::now()),
            added,
            removed,
        });

        self.observer.catalog_refreshed(count, added, removed);
        info!(count, added, removed, "catalog refresh completed");
    }

    /// Fetches every cluster's names concurrently. Failed clusters yield an
    /// empty list.
    async fn fetch_all(&self) -> Vec<Vec<String>> {
        let mut tasks: JoinSet<Vec<String>> = JoinSet::new();
        for backend in &self.backends {
            let backend = backend.clone();
            let observer = self.observer.clone();
            tasks.spawn(async move {
                let started = std::time::Instant::now();
                let result = backend.fetch_catalog().await;
                observer.backend_latency("catalog", started.elapsed());
                match result {
                    Ok(names) => names,
                    Err(e) => {
                        warn!(
                            cluster = %backend.name(),
                            error = %e,
                            "cluster unavailable during catalog refresh"
                        );
                        observer.cluster_failed(backend.name());
                        Vec::new()
                    }
                }
            });
        }

        let mut fetched = Vec::with_capacity(self.backends.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(names) => fetched.push(names),
                Err(e) => warn!(error = %e, "catalog fetch task failed"),
            }
        }
        fetched
    }
}
