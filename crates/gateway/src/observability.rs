//! Optional observability sink.
//!
//! Components report counters and timings through [`GatewayObserver`]. Every
//! method has an empty default, and no component depends on an observer for
//! correctness.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

/// Receives gateway measurements.
pub trait GatewayObserver: Send + Sync {
    /// A catalog refresh completed.
    fn catalog_refreshed(&self, _index_count: usize, _added: usize, _removed: usize) {}

    /// A catalog lookup matched `ratio` of the catalog.
    fn catalog_matched(&self, _ratio: f64) {}

    /// A backend operation finished, successfully or not.
    fn backend_latency(&self, _operation: &'static str, _elapsed: Duration) {}

    /// A cluster failed and was excluded.
    fn cluster_failed(&self, _cluster: &str) {}
}

/// Shared handle to an observer.
pub type DynObserver = Arc<dyn GatewayObserver>;

/// Discards every measurement.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl GatewayObserver for NoopObserver {}

/// Emits measurements as debug events on the `kestrel::metrics` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl GatewayObserver for TracingObserver {
    fn catalog_refreshed(&self, index_count: usize, added: usize, removed: usize) {
        debug!(target: "kestrel::metrics", index_count, added, removed, "catalog_refreshed");
    }

    fn catalog_matched(&self, ratio: f64) {
        debug!(target: "kestrel::metrics", ratio, "catalog_matched");
    }

    fn backend_latency(&self, operation: &'static str, elapsed: Duration) {
        debug!(
            target: "kestrel::metrics",
            operation,
            elapsed_ms = elapsed.as_millis() as u64,
            "backend_latency"
        );
    }

    fn cluster_failed(&self, cluster: &str) {
        debug!(target: "kestrel::metrics", cluster, "cluster_failed");
    }
}

/// Returns the default observer.
pub fn noop() -> DynObserver {
    Arc::new(NoopObserver)
}
