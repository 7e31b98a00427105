//! Cache inspection MCP tools.
//!
//! Both tools work on the current generation's store; `cache_purge` can also
//! drop a stale store by name.

pub mod get;
pub mod purge;

pub use get::{CacheGetParams, get_impl};
pub use purge::{CachePurgeParams, purge_impl};
