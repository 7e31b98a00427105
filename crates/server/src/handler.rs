//! MCP server handler implementation.
//!
//! This module defines the main server handler that routes tool calls to the
//! worker's event handlers and the cache tools.
use std::sync::Arc;

use crate::tools::{
    CacheGetParams, CachePurgeParams, McpHost, SwFetchParams, SwNotificationClickParams, SwPushParams, SwSyncParams,
    cache, sw_fetch, sw_lifecycle, sw_notify, sw_sync,
};

use rentcache_client::Worker;
use rentcache_core::CacheDb;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for the offline cache worker.
#[derive(Clone)]
pub struct RentCacheServer {
    worker: Arc<Worker>,
    db: CacheDb,
    host: Arc<McpHost>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl RentCacheServer {
    /// Create a new server handler.
    pub fn new(worker: Arc<Worker>, db: CacheDb, host: Arc<McpHost>) -> Self {
        Self { worker, db, host, tool_router: Self::tool_router() }
    }

    #[tool(description = "Install the worker: open the current cache generation and precache the app shell.")]
    async fn sw_install(&self) -> Result<CallToolResult, McpError> {
        sw_lifecycle::install_impl(&self.worker, &self.host).await
    }

    #[tool(description = "Activate the installed worker: delete stale cache generations and take control of pages.")]
    async fn sw_activate(&self) -> Result<CallToolResult, McpError> {
        sw_lifecycle::activate_impl(&self.worker, &self.host).await
    }

    /// Route one request through the worker.
    ///
    /// API requests are network-first, media and static assets cache-first, and
    /// page navigations fall back to the offline document.
    #[tool(
        description = "Deliver a fetch event. Returns the route, where the response came from, and the response."
    )]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        sw_fetch::fetch_impl(&self.worker, params.0).await
    }

    #[tool(description = "Deliver a background sync event. The offline-actions tag replays queued requests.")]
    async fn sw_sync(&self, params: Parameters<SwSyncParams>) -> Result<CallToolResult, McpError> {
        sw_sync::sync_impl(&self.worker, &self.host, params.0).await
    }

    #[tool(description = "Deliver a periodic sync event. The content-refresh tag re-fetches catalogue endpoints.")]
    async fn sw_periodic_sync(&self, params: Parameters<SwSyncParams>) -> Result<CallToolResult, McpError> {
        sw_sync::periodic_sync_impl(&self.worker, params.0).await
    }

    #[tool(description = "Deliver a push message and show the resulting notification.")]
    async fn sw_push(&self, params: Parameters<SwPushParams>) -> Result<CallToolResult, McpError> {
        sw_notify::push_impl(&self.worker, &self.host, params.0).await
    }

    #[tool(description = "Deliver a notification click. view-products opens the product listing; dismiss only closes.")]
    async fn sw_notification_click(
        &self, params: Parameters<SwNotificationClickParams>,
    ) -> Result<CallToolResult, McpError> {
        sw_notify::notification_click_impl(&self.worker, &self.host, params.0).await
    }

    #[tool(description = "Get the current generation's cached entry for a URL.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        cache::get_impl(&self.worker, params.0).await
    }

    #[tool(description = "Delete current-generation entries whose URL contains a pattern, or drop a stale store.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        cache::purge_impl(&self.worker, &self.db, params.0).await
    }
}

impl ServerHandler for RentCacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "rentcache-sw".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::fixtures::fixture;

    #[tokio::test]
    async fn test_all_tools_listed() {
        let f = fixture().await;
        let server = RentCacheServer::new(f.worker, f.db, f.host);

        let mut names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        names.sort();

        assert_eq!(
            names,
            vec![
                "cache_get",
                "cache_purge",
                "sw_activate",
                "sw_fetch",
                "sw_install",
                "sw_notification_click",
                "sw_periodic_sync",
                "sw_push",
                "sw_sync",
            ]
        );
    }
}
