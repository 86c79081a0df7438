//! Backend implementations.

pub mod elasticsearch;
