//! Per-classification fetch strategies.
//!
//! Each strategy is a plain async function of the request, the current
//! store and the network. Cache writes are spawned, not awaited, so a live
//! response is never held up by SQLite; the spawned write travels with the
//! [`StrategyOutcome`] for callers that want to wait on it.
//!
//! Nothing here locks around the cache. Two concurrent misses for the same
//! key both fetch and both write; the later upsert wins.

pub mod cache_first;
pub mod navigation;
pub mod network_first;
pub mod offline;

use serde::Serialize;
use tokio::task::JoinHandle;

use rentcache_core::{CacheStore, Request, Response};

use crate::route::Classification;

pub use cache_first::cache_first;
pub use navigation::{navigation, offline_fallback};
pub use network_first::network_first;
pub use offline::{OFFLINE_MARKER, offline_page, service_unavailable};

/// The fixed algorithm applied to a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    NetworkFirst,
    CacheFirst,
    NavigationFallback,
}

impl From<Classification> for Strategy {
    fn from(classification: Classification) -> Self {
        match classification {
            Classification::Api => Strategy::NetworkFirst,
            Classification::Media | Classification::Static => Strategy::CacheFirst,
            Classification::Navigation => Strategy::NavigationFallback,
        }
    }
}

/// Where a response handed to the page came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Network,
    Cache,
    OfflineDocument,
    Synthesized,
}

/// A response plus the cache write it triggered, if any.
#[derive(Debug)]
pub struct StrategyOutcome {
    pub response: Response,
    pub source: Source,
    write: Option<JoinHandle<()>>,
}

impl StrategyOutcome {
    pub fn new(response: Response, source: Source) -> Self {
        Self { response, source, write: None }
    }

    fn from_network(response: Response, write: Option<JoinHandle<()>>) -> Self {
        Self { response, source: Source::Network, write }
    }

    pub fn has_pending_write(&self) -> bool {
        self.write.is_some()
    }

    /// Wait for the background cache write, then hand back the response.
    pub async fn settled(self) -> Response {
        if let Some(write) = self.write
            && let Err(e) = write.await
        {
            tracing::warn!("cache write task failed: {e}");
        }
        self.response
    }
}

/// Cache lookup that treats store failures as misses.
pub(crate) async fn lookup(cache: &CacheStore, request: &Request) -> Option<Response> {
    match cache.match_request(request).await {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!("cache lookup failed for {}: {e}", request.describe());
            None
        }
    }
}

/// Spawn a write of `response` under `request` when it is cacheable.
pub(crate) fn write_back(cache: &CacheStore, request: &Request, response: &Response) -> Option<JoinHandle<()>> {
    if !request.method.is_read() || !response.is_success() {
        return None;
    }

    let cache = cache.clone();
    let request = request.clone();
    let response = response.clone();
    Some(tokio::spawn(async move {
        if let Err(e) = cache.put(&request, &response).await {
            tracing::warn!("failed to cache {}: {e}", request.describe());
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{get, store};

    #[test]
    fn test_strategy_for_classification() {
        assert_eq!(Strategy::from(Classification::Api), Strategy::NetworkFirst);
        assert_eq!(Strategy::from(Classification::Media), Strategy::CacheFirst);
        assert_eq!(Strategy::from(Classification::Static), Strategy::CacheFirst);
        assert_eq!(Strategy::from(Classification::Navigation), Strategy::NavigationFallback);
    }

    #[tokio::test]
    async fn test_write_back_skips_non_success() {
        let cache = store().await;
        let request = get("/api/products/unknown");
        assert!(write_back(&cache, &request, &Response::new(404, "missing")).is_none());
        assert!(write_back(&cache, &request, &Response::new(500, "boom")).is_none());
    }

    #[tokio::test]
    async fn test_write_back_stores_success() {
        let cache = store().await;
        let request = get("/manifest.json");
        let response = Response::new(200, "{}");

        let outcome = StrategyOutcome::from_network(response.clone(), write_back(&cache, &request, &response));
        assert!(outcome.has_pending_write());
        outcome.settled().await;

        assert_eq!(cache.match_request(&request).await.unwrap(), Some(response));
    }
}
