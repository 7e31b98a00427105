//! sw_sync and sw_periodic_sync tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use rentcache_client::{RefreshReport, ReplayReport, RequestRouter, Worker};

use super::{HostEvent, McpHost, json_result};

/// Input parameters for the sync tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SwSyncParams {
    /// Sync tag. Defaults to the worker's own tag for the event.
    #[serde(default)]
    pub tag: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SwSyncOutput {
    pub tag: String,
    /// False when the tag is not one the worker handles.
    pub handled: bool,
    pub replay: Option<ReplayReport>,
    pub host_events: Vec<HostEvent>,
}

#[derive(Debug, Serialize)]
pub struct SwPeriodicSyncOutput {
    pub tag: String,
    pub handled: bool,
    pub refresh: Option<RefreshReport>,
}

/// Deliver a one-shot sync event.
pub async fn sync_impl(worker: &Worker, host: &McpHost, params: SwSyncParams) -> Result<CallToolResult, McpError> {
    let tag = params.tag.unwrap_or_else(|| worker.settings().sync_tag.clone());
    let (replay, host_events) = host.capture(worker.sync(&tag)).await;
    let replay = replay?;
    let output = SwSyncOutput { tag, handled: replay.is_some(), replay, host_events };
    json_result(&output)
}

/// Deliver a periodic sync event.
pub async fn periodic_sync_impl(worker: &Worker, params: SwSyncParams) -> Result<CallToolResult, McpError> {
    let tag = params
        .tag
        .unwrap_or_else(|| worker.settings().periodic_sync_tag.clone());
    let refresh = worker.periodic_sync(&tag).await?;
    let output = SwPeriodicSyncOutput { tag, handled: refresh.is_some(), refresh };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::fixtures::{active_fixture, output};
    use rentcache_core::{Method, Request, RequestMode, Response};
    use url::Url;

    #[tokio::test]
    async fn test_sync_default_tag_replays_queue() {
        let f = active_fixture().await;
        f.network.respond("https://shop.test/api/bookings", Response::new(201, "{}"));
        let booking = Request::new(
            Method::Post,
            Url::parse("https://shop.test/api/bookings").unwrap(),
            RequestMode::Cors,
        )
        .with_body("{}");
        f.worker.queue().enqueue(booking).await;

        let result = output(&sync_impl(&f.worker, &f.host, SwSyncParams::default()).await.unwrap());

        assert_eq!(result["tag"], "offline-actions");
        assert_eq!(result["handled"], true);
        assert_eq!(result["replay"]["replayed"][0], 1);
        assert_eq!(result["host_events"][0]["tag"], "sync-complete");
    }

    #[tokio::test]
    async fn test_unknown_sync_tag_ignored() {
        let f = active_fixture().await;
        let params = SwSyncParams { tag: Some("newsletter".into()) };

        let result = output(&sync_impl(&f.worker, &f.host, params).await.unwrap());
        assert_eq!(result["handled"], false);
        assert!(result["host_events"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_periodic_sync_refreshes() {
        let f = active_fixture().await;
        f.network.respond("https://shop.test/api/categories", Response::new(200, "[]"));

        let result = output(&periodic_sync_impl(&f.worker, SwSyncParams::default()).await.unwrap());

        assert_eq!(result["tag"], "content-refresh");
        assert_eq!(result["refresh"]["refreshed"][0], "https://shop.test/api/categories");
        assert_eq!(result["refresh"]["failed"].as_array().unwrap().len(), 2);
    }
}
