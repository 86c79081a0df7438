//! In-memory session store with TTL expiry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::types::LogQueryRequest;

use super::session::{PaginationSession, total_pages};

/// Default session lifetime.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(3600);

/// Longest supported lifetime, one hundred years.
const MAX_TTL_SECS: u64 = 100 * 365 * 24 * 3600;

/// Session store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Lifetime of a session from creation (default: 1h).
    #[serde(with = "humantime_serde", default = "default_ttl")]
    pub ttl: Duration,
}

fn default_ttl() -> Duration {
    DEFAULT_SESSION_TTL
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { ttl: default_ttl() }
    }
}

/// Holds pagination sessions until they expire.
///
/// Every operation takes the same lock, so creation, lookup, and the expiry
/// sweep never interleave.
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Arc<PaginationSession>>>,
    ttl: chrono::Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new(config: SessionConfig) -> Self {
        let secs = config.ttl.as_secs().min(MAX_TTL_SECS) as i64;
        let ttl = chrono::Duration::seconds(secs);
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Returns the number of stored sessions, expired ones included.
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Returns true if no sessions are stored.
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    /// Purges expired sessions, then stores and returns a new one.
    pub fn create_session(
        &self,
        tenant_id: impl Into<String>,
        query: LogQueryRequest,
        total_items: u64,
        page_size: u64,
    ) -> Arc<PaginationSession> {
        self.create_session_at(tenant_id.into(), query, total_items, page_size, Utc::now())
    }

    pub(crate) fn create_session_at(
        &self,
        tenant_id: String,
        query: LogQueryRequest,
        total_items: u64,
        page_size: u64,
        now: DateTime<Utc>,
    ) -> Arc<PaginationSession> {
        let page_size = page_size.max(1);
        let session = Arc::new(PaginationSession {
            session_id: Uuid::new_v4().to_string(),
            tenant_id,
            query,
            total_items,
            page_size,
            total_pages: total_pages(total_items, page_size),
            created_at: now,
            expires_at: now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        });

        let mut sessions = self.sessions.lock();
        purge_expired(&mut sessions, now);
        sessions.insert(session.session_id.clone(), session.clone());
        debug!(
            session_id = %session.session_id,
            total_pages = session.total_pages,
            "pagination session created"
        );
        session
    }

    /// Purges expired sessions, then returns the session if it is live.
    ///
    /// Never-existed and expired look the same to the caller.
    pub fn get_session(&self, session_id: &str) -> Option<Arc<PaginationSession>> {
        self.get_session_at(session_id, Utc::now())
    }

    pub(crate) fn get_session_at(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Option<Arc<PaginationSession>> {
        let mut sessions = self.sessions.lock();
        purge_expired(&mut sessions, now);
        sessions.get(session_id).cloned()
    }

    /// Like [`get_session`](Self::get_session), but a session belonging to
    /// another tenant is reported as absent. It is not removed.
    pub fn get_owned_session(
        &self,
        session_id: &str,
        tenant_id: &str,
    ) -> Option<Arc<PaginationSession>> {
        self.get_owned_session_at(session_id, tenant_id, Utc::now())
    }

    pub(crate) fn get_owned_session_at(
        &self,
        session_id: &str,
        tenant_id: &str,
        now: DateTime<Utc>,
    ) -> Option<Arc<PaginationSession>> {
        self.get_session_at(session_id, now)
            .filter(|session| session.tenant_id == tenant_id)
    }

    /// Returns true if `1 <= page <= session.total_pages`.
    pub fn is_valid_page(session: &PaginationSession, page: i64) -> bool {
        session.is_valid_page(page)
    }
}

fn purge_expired(sessions: &mut HashMap<String, Arc<PaginationSession>>, now: DateTime<Utc>) {
    let before = sessions.len();
    sessions.retain(|_, session| !session.is_expired_at(now));
    let purged = before - sessions.len();
    if purged > 0 {
        debug!(purged, "expired pagination sessions purged");
    }
}

/// Serde module for Duration with humantime format.
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
