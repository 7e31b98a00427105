//! sw_fetch tool implementation.
//!
//! Delivers one fetch event to the worker and reports the routing decision,
//! the response source and the response itself.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use rentcache_client::fetch::resolve;
use rentcache_client::{RequestRouter, Route, Source, Worker};
use rentcache_core::{Error, Method, Request, RequestMode};

use super::json_result;

/// Input parameters for sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// Absolute URL, or a path resolved against the storefront origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request mode: "navigate", "same-origin" (default), "no-cors" or "cors".
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Extra request headers as name/value pairs.
    #[serde(default)]
    pub headers: Vec<HeaderParam>,

    /// Request body, sent as UTF-8.
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HeaderParam {
    pub name: String,
    pub value: String,
}

fn default_method() -> String {
    "GET".into()
}

fn default_mode() -> String {
    "same-origin".into()
}

/// Output structure for sw_fetch tool.
#[derive(Debug, Serialize)]
pub struct SwFetchOutput {
    /// Canonical request URL.
    pub url: String,
    pub route: Route,
    pub source: Source,
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8, lossily.
    pub body: String,
}

impl SwFetchParams {
    fn into_request(self, worker: &Worker) -> Result<Request, Error> {
        let origin = worker.settings().selector.origin();
        let url = resolve(origin, &self.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let method: Method = self.method.parse()?;
        let mode: RequestMode = self.mode.parse()?;

        let mut request = Request::new(method, url, mode);
        for header in self.headers {
            request = request.with_header(header.name, header.value);
        }
        if let Some(body) = self.body {
            request = request.with_body(body);
        }
        Ok(request)
    }
}

/// Implementation of the sw_fetch tool.
///
/// Waits for the cache write the fetch started, so a following `cache_get`
/// sees it.
pub async fn fetch_impl(worker: &Worker, params: SwFetchParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let request = params.into_request(worker)?;
    let url = request.url.to_string();
    let outcome = worker.fetch(request).await?;
    let (route, source) = (outcome.route, outcome.source());
    let response = outcome.settled().await;

    let output = SwFetchOutput {
        url,
        route,
        source,
        status: response.status,
        content_type: response.content_type().map(str::to_string),
        body: response.text(),
        headers: response.headers,
    };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::fixtures::{active_fixture, fixture, output};
    use rentcache_core::Response;

    fn params(url: &str) -> SwFetchParams {
        SwFetchParams {
            url: url.into(),
            method: default_method(),
            mode: default_mode(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[tokio::test]
    async fn test_empty_url_rejected() {
        let f = fixture().await;
        let err = fetch_impl(&f.worker, params("  ")).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }

    #[tokio::test]
    async fn test_bad_mode_rejected() {
        let f = fixture().await;
        let err = fetch_impl(&f.worker, SwFetchParams { mode: "teleport".into(), ..params("/") })
            .await
            .unwrap_err();
        assert_eq!(err.code.0, -32602);
    }

    #[tokio::test]
    async fn test_api_fetch_then_offline() {
        let f = active_fixture().await;
        f.network
            .respond("https://shop.test/api/brands", Response::new(200, r#"{"success":true,"data":[]}"#));

        let online = output(&fetch_impl(&f.worker, params("/api/brands")).await.unwrap());
        assert_eq!(online["route"]["route"], "intercept");
        assert_eq!(online["route"]["reason"], "api");
        assert_eq!(online["source"], "network");

        f.network.clear();
        let offline = output(&fetch_impl(&f.worker, params("/api/brands")).await.unwrap());
        assert_eq!(offline["source"], "cache");
        assert_eq!(offline["body"], r#"{"success":true,"data":[]}"#);
    }

    #[tokio::test]
    async fn test_offline_navigation() {
        let f = active_fixture().await;
        let request = SwFetchParams { mode: "navigate".into(), ..params("/products/sony-a7-iv") };

        let result = output(&fetch_impl(&f.worker, request).await.unwrap());
        assert_eq!(result["source"], "offline_document");
        assert_eq!(result["body"], "<h1>Offline</h1>");
    }

    #[tokio::test]
    async fn test_bypassed_request_surfaces_network_error() {
        let f = active_fixture().await;
        let request = SwFetchParams { method: "POST".into(), body: Some("{}".into()), ..params("/api/bookings") };

        let err = fetch_impl(&f.worker, request).await.unwrap_err();
        assert_eq!(err.code.0, -32004);
    }
}
