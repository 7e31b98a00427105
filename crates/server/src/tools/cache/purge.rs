//! cache_purge tool implementation.
//!
//! Deletes current-generation entries by URL pattern, or drops a stale store.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use rentcache_client::Worker;
use rentcache_core::{CacheDb, Error};

use crate::tools::json_result;

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Delete current-generation entries whose URL contains this text.
    #[serde(default)]
    pub url_contains: Option<String>,

    /// Drop this whole store. The current generation's store is refused.
    #[serde(default)]
    pub store: Option<String>,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Number of entries deleted by pattern.
    pub deleted: u64,
    /// Whether the named store existed and was dropped.
    pub store_dropped: bool,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(worker: &Worker, db: &CacheDb, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    if params.url_contains.is_none() && params.store.is_none() {
        return Err(Error::InvalidInput("At least one of url_contains or store must be specified".to_string()).into());
    }

    let current = &worker.settings().cache.store_name;
    if params.store.as_deref() == Some(current.as_str()) {
        return Err(Error::InvalidInput(format!("{current} is the current generation")).into());
    }

    let mut output = CachePurgeOutput { deleted: 0, store_dropped: false };

    if let Some(pattern) = params.url_contains {
        if pattern.is_empty() {
            return Err(Error::InvalidInput("url_contains cannot be empty".to_string()).into());
        }
        output.deleted = worker.current_store().delete_matching(&pattern).await?;
    }

    if let Some(store) = params.store {
        output.store_dropped = db.delete_store(&store).await?;
    }

    tracing::info!(deleted = output.deleted, store_dropped = output.store_dropped, "cache purge");
    json_result(&output)
}
