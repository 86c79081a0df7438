//! Server-held pagination sessions.
//!
//! A session freezes a query together with its total count and page count,
//! so later page fetches only need the session id and a page number.
//! Sessions live in memory and expire after a fixed TTL.

mod session;
mod store;

pub use session::{PaginationSession, total_pages};
pub use store::{DEFAULT_SESSION_TTL, SessionConfig, SessionStore};
