//! Query translation.
//!
//! [`QueryAdapter`] turns a [`SearchRequestSpec`](crate::types::SearchRequestSpec)
//! into a [`SearchDsl`] body, independent of which clusters will run it.
//!
//! # Example
//!
//! ```
//! use kestrel_gateway::query::{AdapterConfig, QueryAdapter};
//! use kestrel_gateway::types::SearchRequestSpec;
//!
//! let adapter = QueryAdapter::new(AdapterConfig::default());
//! let dsl = adapter.build(&SearchRequestSpec::new("acme").with_page(2, 10));
//!
//! assert_eq!(dsl.size(), 10);
//! assert_eq!(dsl.sort().len(), 2);
//! ```

mod adapter;
pub mod fields;

pub use adapter::{
    ALL_TENANTS, AdapterConfig, PAGE_SIZE_CAP, QueryAdapter, STATS_BUCKET_LIMIT, SearchDsl,
    service_variants,
};
