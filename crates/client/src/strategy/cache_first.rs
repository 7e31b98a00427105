//! Cache-first strategy for media and static assets.

use rentcache_core::{CacheStore, Error, Request};

use super::{Source, StrategyOutcome, lookup, write_back};
use crate::fetch::Network;

/// Serve from the store when possible; the network is only touched on a miss.
///
/// A network failure on a miss is returned to the caller; no placeholder is
/// made up here.
pub async fn cache_first(
    request: &Request, cache: &CacheStore, network: &dyn Network,
) -> Result<StrategyOutcome, Error> {
    if let Some(cached) = lookup(cache, request).await {
        tracing::debug!("cache hit for {}", request.describe());
        return Ok(StrategyOutcome::new(cached, Source::Cache));
    }

    let response = network.fetch(request).await?;
    let write = write_back(cache, request, &response);
    Ok(StrategyOutcome::from_network(response, write))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockNetwork, get, store};
    use rentcache_core::Response;

    fn webp(bytes: &[u8]) -> Response {
        Response::new(200, bytes.to_vec()).with_header("content-type", "image/webp")
    }

    #[tokio::test]
    async fn test_hit_makes_no_network_call() {
        let cache = store().await;
        let network = MockNetwork::new();
        let request = get("/storage/lens-1.webp");
        cache.put(&request, &webp(&[0x52, 0x49, 0x46, 0x46])).await.unwrap();

        let outcome = cache_first(&request, &cache, &network).await.unwrap();

        assert_eq!(outcome.source, Source::Cache);
        assert_eq!(outcome.response.body, vec![0x52, 0x49, 0x46, 0x46]);
        assert_eq!(network.calls(), 0);
    }

    #[tokio::test]
    async fn test_miss_fetches_and_stores() {
        let cache = store().await;
        let network = MockNetwork::new();
        network.respond("/assets/app.js", Response::new(200, "console.log(1)"));
        let request = get("/assets/app.js");

        let first = cache_first(&request, &cache, &network).await.unwrap();
        assert_eq!(first.source, Source::Network);
        first.settled().await;

        let second = cache_first(&request, &cache, &network).await.unwrap();
        assert_eq!(second.source, Source::Cache);
        assert_eq!(network.calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_misses_both_fetch_and_leave_one_entry() {
        let cache = store().await;
        let network = MockNetwork::new();
        network.respond("/storage/lens-3.webp", webp(&[0x52, 0x49, 0x46, 0x46]));
        let request = get("/storage/lens-3.webp");

        // Both lookups are queued on the connection before either write.
        let (a, b) = tokio::join!(
            cache_first(&request, &cache, &network),
            cache_first(&request, &cache, &network)
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.source, Source::Network);
        assert_eq!(b.source, Source::Network);
        a.settled().await;
        b.settled().await;

        assert_eq!(network.calls(), 2);
        assert_eq!(cache.keys().await.unwrap(), vec![format!("GET {}", request.url)]);
        let stored = cache.match_request(&request).await.unwrap().unwrap();
        assert!(stored.is_success());
        assert_eq!(stored.body, vec![0x52, 0x49, 0x46, 0x46]);
    }

    #[tokio::test]
    async fn test_miss_while_offline_propagates() {
        let cache = store().await;
        let network = MockNetwork::new();
        network.go_offline();

        let result = cache_first(&get("/storage/lens-2.webp"), &cache, &network).await;
        assert!(matches!(result, Err(Error::Network(_))));
    }

    #[tokio::test]
    async fn test_not_found_is_not_cached() {
        let cache = store().await;
        let network = MockNetwork::new();
        let request = get("/images/missing.png");

        let outcome = cache_first(&request, &cache, &network).await.unwrap();
        assert_eq!(outcome.settled().await.status, 404);

        cache_first(&request, &cache, &network).await.unwrap();
        assert_eq!(network.calls(), 2);
    }
}
