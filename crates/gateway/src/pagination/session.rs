//! Pagination sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::LogQueryRequest;

/// A server-held binding of a session id to a frozen query.
///
/// The page count is fixed at creation. Sessions are never mutated; lookups
/// hand out shared snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationSession {
    /// Globally unique identifier.
    pub session_id: String,
    /// Tenant that created the session.
    pub tenant_id: String,
    /// The query, frozen at creation.
    pub query: LogQueryRequest,
    /// Matching documents at creation time.
    pub total_items: u64,
    /// Hits per page.
    pub page_size: u64,
    /// `ceil(total_items / page_size)`.
    pub total_pages: u64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
}

impl PaginationSession {
    /// Returns true once `now` is past the expiry time.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Returns true if the session has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Returns true if `1 <= page <= total_pages`.
    pub fn is_valid_page(&self, page: i64) -> bool {
        page >= 1 && (page as u64) <= self.total_pages
    }
}

/// Number of pages needed for `total_items` at `page_size` per page.
///
/// A zero page size is treated as one.
pub fn total_pages(total_items: u64, page_size: u64) -> u64 {
    total_items.div_ceil(page_size.max(1))
}
