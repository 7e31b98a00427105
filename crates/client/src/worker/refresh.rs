//! Background work outside the request path: cache re-warming on the
//! periodic signal and offline-action replay on the connectivity signal.
//!
//! Every endpoint and every action is its own failure domain: one failure is
//! logged and the rest of the batch carries on.

use serde::Serialize;
use url::Url;

use rentcache_core::{CacheStore, Error, Request};

use super::queue::OfflineQueue;
use crate::fetch::Network;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshFailure {
    pub url: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub refreshed: Vec<String>,
    pub failed: Vec<RefreshFailure>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    pub replayed: Vec<u64>,
    pub still_pending: Vec<u64>,
}

/// Re-fetch each endpoint and overwrite its entry on success.
///
/// Failed endpoints keep whatever entry they already had.
pub async fn refresh_endpoints(endpoints: &[Url], cache: &CacheStore, network: &dyn Network) -> RefreshReport {
    let mut report = RefreshReport::default();

    for endpoint in endpoints {
        let request = Request::get(endpoint.clone());
        let result = match network.fetch(&request).await {
            Ok(response) if response.is_success() => cache.put(&request, &response).await,
            Ok(response) => Err(Error::NotCacheable(format!("status {}", response.status))),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                tracing::debug!("refreshed {endpoint}");
                report.refreshed.push(endpoint.to_string());
            }
            Err(e) => {
                tracing::warn!("background refresh of {endpoint} failed: {e}");
                report
                    .failed
                    .push(RefreshFailure { url: endpoint.to_string(), error: e.to_string() });
            }
        }
    }

    report
}

/// Replay every queued action. 2xx replays leave the queue; the rest go back
/// to the front for the next signal.
pub async fn replay_pending(queue: &OfflineQueue, network: &dyn Network) -> ReplayReport {
    let mut report = ReplayReport::default();
    let mut failed = Vec::new();

    for action in queue.take_all().await {
        match network.fetch(&action.request).await {
            Ok(response) if response.is_success() => report.replayed.push(action.id),
            Ok(response) => {
                tracing::warn!(id = action.id, "replay of {} returned {}", action.request.describe(), response.status);
                report.still_pending.push(action.id);
                failed.push(action);
            }
            Err(e) => {
                tracing::warn!(id = action.id, "replay of {} failed: {e}", action.request.describe());
                report.still_pending.push(action.id);
                failed.push(action);
            }
        }
    }

    queue.requeue_front(failed).await;
    report
}
