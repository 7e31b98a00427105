//! SQLite-backed persistent cache store.
//!
//! Holds one named store per cache generation, with async access via
//! tokio-rusqlite. It supports:
//!
//! - Request-keyed entries (SHA-256 of method and canonical URL)
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Generation-level eviction (whole stores are dropped, never single entries by age)

pub mod connection;
pub mod hash;
pub mod migrations;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use store::{CacheConfig, CacheEntry, CacheStore, request_key};
