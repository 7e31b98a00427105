//! MCP tool implementations.
//!
//! The `sw_*` tools deliver one host event each to the worker; the `cache_*`
//! tools inspect and prune the current store.

pub mod cache;
pub mod host;
pub mod sw_fetch;
pub mod sw_lifecycle;
pub mod sw_notify;
pub mod sw_sync;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use rentcache_core::Error;
use serde::Serialize;

pub use cache::{CacheGetParams, CachePurgeParams};
pub use host::{HostEvent, McpHost};
pub use sw_fetch::SwFetchParams;
pub use sw_notify::{SwNotificationClickParams, SwPushParams};
pub use sw_sync::SwSyncParams;

/// Serialize a tool output as the single text content of a successful result.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
