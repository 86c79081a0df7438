//! Core types for the gateway.
//!
//! - [`SearchRequestSpec`], [`LogQueryRequest`], [`StatsRequest`] - Caller requests
//! - [`CursorToken`], [`CursorPosition`] - Cursor continuation
//! - [`MergedResult`], [`AggregatedResult`] - Federated results
//!
//! # Example
//!
//! ```
//! use kestrel_gateway::types::{LogFilters, SearchRequestSpec, SortOrder};
//!
//! let spec = SearchRequestSpec::new("acme")
//!     .with_page(2, 20)
//!     .with_time_range("2025-01-01T00:00:00Z", "2025-01-02T00:00:00Z")
//!     .with_filters(LogFilters {
//!         level: vec!["ERROR".to_string()],
//!         ..Default::default()
//!     })
//!     .with_sort("timestamp", SortOrder::Desc);
//!
//! assert_eq!(spec.pagination.page, 2);
//! ```

mod cursor;
mod request;
mod result;

pub use cursor::CursorToken;
pub use request::{
    CursorPosition, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, GroupBy, IndexTarget, LogFilters,
    LogQueryRequest, PageRequest, PaginationMode, SearchRequestSpec, SortOrder, SortSpec,
    StatsRequest, TimeRange,
};
pub use result::{
    AggregatedResult, AggregationBucket, GROUP_STATS_AGG, MergedResult, response_buckets,
    response_hits, response_total,
};
