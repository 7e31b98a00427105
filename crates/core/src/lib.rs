//! Core types and shared functionality for rentcache.
//!
//! This crate provides:
//! - Request/response values shared by the worker and its hosts
//! - Generation-versioned cache store with SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod message;

pub use cache::{CacheConfig, CacheDb, CacheEntry, CacheStore};
pub use config::AppConfig;
pub use error::Error;
pub use message::{Method, Request, RequestMode, Response};
