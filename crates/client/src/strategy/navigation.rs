//! Network-first strategy for page navigations with an offline fallback.

use rentcache_core::{CacheStore, Error, Request};

use super::{Source, StrategyOutcome, lookup, offline_page, write_back};
use crate::fetch::Network;

/// Fetch the page; when the network fails, serve the offline document, or
/// the inline offline page if that was never cached. Never fails on the
/// network path.
pub async fn navigation(
    request: &Request, cache: &CacheStore, network: &dyn Network, offline_document: &Request,
) -> Result<StrategyOutcome, Error> {
    match network.fetch(request).await {
        Ok(response) => {
            let write = write_back(cache, request, &response);
            Ok(StrategyOutcome::from_network(response, write))
        }
        Err(err) => {
            tracing::warn!("navigation to {} failed, serving offline page: {err}", request.url);
            Ok(offline_fallback(cache, offline_document).await)
        }
    }
}

/// The cached offline document, or the synthesized page.
pub async fn offline_fallback(cache: &CacheStore, offline_document: &Request) -> StrategyOutcome {
    match lookup(cache, offline_document).await {
        Some(document) => StrategyOutcome::new(document, Source::OfflineDocument),
        None => StrategyOutcome::new(offline_page(), Source::Synthesized),
    }
}
