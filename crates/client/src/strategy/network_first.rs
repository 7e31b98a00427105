//! Network-first strategy for API requests.

use rentcache_core::{CacheStore, Error, Request};

use super::{Source, StrategyOutcome, lookup, write_back};
use crate::fetch::Network;

/// Try the network; fall back to the cached copy only when the request
/// produced no response at all.
///
/// Any HTTP status counts as a network success and is returned as-is; only
/// 2xx responses are written back. No retries happen here.
pub async fn network_first(
    request: &Request, cache: &CacheStore, network: &dyn Network,
) -> Result<StrategyOutcome, Error> {
    match network.fetch(request).await {
        Ok(response) => {
            let write = write_back(cache, request, &response);
            Ok(StrategyOutcome::from_network(response, write))
        }
        Err(err) => {
            tracing::debug!("network failed for {}, trying cache: {err}", request.describe());
            match lookup(cache, request).await {
                Some(cached) => Ok(StrategyOutcome::new(cached, Source::Cache)),
                None => Err(err),
            }
        }
    }
}
