//! Multi-cluster query federation.
//!
//! [`FederationCoordinator`] sends one body to every configured cluster,
//! tolerates partial failure, and merges what comes back:
//!
//! - totals are summed over the clusters that answered
//! - hits are ordered by effective timestamp, newest first, and cut to the
//!   requested size
//! - aggregation buckets are summed by key
//!
//! The merge functions in [`merger`] are pure and usable on their own.

mod coordinator;
pub mod merger;

pub use coordinator::FederationCoordinator;
pub use merger::{merge_buckets, merge_key, merge_responses};
