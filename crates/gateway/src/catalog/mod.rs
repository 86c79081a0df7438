//! Index catalog: the live set of valid index names.
//!
//! - [`IndexCatalog`] - Background discovery loop and lookups
//! - [`CatalogConfig`], [`CatalogConfigUpdate`] - Runtime configuration
//! - [`IndexPatterns`] - Include/exclude rules
//!
//! # Lifecycle
//!
//! `Idle -> Refreshing -> Idle`, repeated every `interval_seconds` while
//! enabled. [`IndexCatalog::startup`] spawns the loop and
//! [`IndexCatalog::shutdown`] stops it; the loop sleeps in one-second steps so
//! shutdown never waits for a full interval.

mod config;
mod discovery;
mod matcher;

pub use config::{
    CatalogConfig, CatalogConfigUpdate, DEFAULT_INCLUDE_PATTERN, DEFAULT_INTERVAL_SECONDS,
};
pub use discovery::{CatalogStatus, IndexCatalog, SHUTDOWN_TIMEOUT, SLEEP_STEP};
pub use matcher::{IndexPatterns, find_matches};
