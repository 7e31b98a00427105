//! Responses synthesized when neither the network nor the cache can answer.
//!
//! Both carry `Cache-Control: no-store` and a non-2xx status, so they can
//! never be written into a store.

use rentcache_core::Response;

/// Marker text shown on the inline offline page.
pub const OFFLINE_MARKER: &str = "Anda Sedang Offline";

const OFFLINE_PAGE: &str = r#"<!DOCTYPE html>
<html lang="id">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Offline</title>
<style>
body{font-family:system-ui,sans-serif;display:flex;align-items:center;justify-content:center;min-height:100vh;margin:0;background:#f8fafc;color:#0f172a}
main{text-align:center;padding:2rem}
button{margin-top:1rem;padding:.6rem 1.2rem;border:0;border-radius:.5rem;background:#0f172a;color:#fff;cursor:pointer}
</style>
</head>
<body>
<main>
<h1>Anda Sedang Offline</h1>
<p>Periksa koneksi internet Anda, lalu coba lagi.</p>
<button onclick="location.reload()">Coba Lagi</button>
</main>
</body>
</html>
"#;

/// Self-contained HTML page for navigations that failed with no offline document cached.
pub fn offline_page() -> Response {
    Response::new(503, OFFLINE_PAGE)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_header("cache-control", "no-store")
}

/// Generic last-resort response for subresources.
pub fn service_unavailable() -> Response {
    Response::new(503, "Service Unavailable")
        .with_header("content-type", "text/plain; charset=utf-8")
        .with_header("cache-control", "no-store")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_page_has_marker() {
        let page = offline_page();
        assert!(page.text().contains(OFFLINE_MARKER));
        assert_eq!(page.content_type(), Some("text/html; charset=utf-8"));
        assert!(!page.is_success());
    }

    #[test]
    fn test_offline_page_is_self_contained() {
        let html = offline_page().text();
        assert!(!html.contains("src="));
        assert!(!html.contains("href="));
    }

    #[test]
    fn test_service_unavailable() {
        let response = service_unavailable();
        assert_eq!(response.status, 503);
        assert_eq!(response.header("cache-control"), Some("no-store"));
    }
}
