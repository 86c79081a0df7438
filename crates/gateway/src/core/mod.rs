//! Core traits.
//!
//! - [`SearchBackend`] - One cluster as seen by the coordinator and the catalog

mod backend;

pub use backend::{DynBackend, SearchBackend};
