//! HTTP request handlers.
//!
//! - [`logs`] - Log query, statistics and pagination sessions
//! - [`indices`] - Index catalog listing, configuration and refresh
//! - [`health`] - Health check endpoints

pub mod health;
pub mod indices;
pub mod logs;

pub use health::{health_handler, liveness_handler};
pub use indices::{config_handler, list_handler, refresh_handler};
pub use logs::{paginate_get_handler, paginate_init_handler, query_handler, stats_handler};
