//! cache_get tool implementation.
//!
//! Retrieves the current generation's entry for a request.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use rentcache_client::Worker;
use rentcache_client::fetch::resolve;
use rentcache_core::cache::request_key;
use rentcache_core::{Error, Method, Request, RequestMode};

use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Absolute URL, or a path resolved against the storefront origin.
    pub url: String,

    /// Method the entry was stored under (default: GET).
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "GET".into()
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub store_name: String,
    pub key_hash: String,
    pub method: String,
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8, lossily.
    pub body: String,
    pub size: usize,
    pub stored_at: String,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(worker: &Worker, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let url = resolve(worker.settings().selector.origin(), &params.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let method: Method = params.method.parse()?;
    let request = Request::new(method, url, RequestMode::default());

    let entry = worker
        .current_store()
        .get_entry(&request_key(&request))
        .await?
        .ok_or_else(|| Error::CacheMiss(request.describe()))?;

    let output = CacheGetOutput {
        body: String::from_utf8_lossy(&entry.body).into_owned(),
        size: entry.body.len(),
        store_name: entry.store_name,
        key_hash: entry.key_hash,
        method: entry.method,
        url: entry.url,
        status: entry.status_code,
        headers: entry.headers,
        stored_at: entry.stored_at,
    };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::fixtures::{active_fixture, output};
    use rentcache_core::Response;

    #[tokio::test]
    async fn test_get_missing() {
        let f = active_fixture().await;
        let params = CacheGetParams { url: "/api/brands".into(), method: default_method() };

        let err = get_impl(&f.worker, params).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
    }

    #[tokio::test]
    async fn test_get_found() {
        let f = active_fixture().await;
        let request = Request::get(url::Url::parse("https://shop.test/api/brands").unwrap());
        f.worker
            .current_store()
            .put(&request, &Response::new(200, "[\"canon\"]"))
            .await
            .unwrap();

        let params = CacheGetParams { url: "/api/brands".into(), method: "get".into() };
        let result = output(&get_impl(&f.worker, params).await.unwrap());

        assert_eq!(result["store_name"], "rental-storefront-v1");
        assert_eq!(result["body"], "[\"canon\"]");
        assert_eq!(result["status"], 200);
    }
}
