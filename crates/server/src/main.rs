//! rentcache-sw server entry point.
//!
//! Boots the offline cache worker and exposes its events as MCP tools on
//! stdio. Logging goes to stderr to avoid interfering with the JSON-RPC
//! protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rentcache_client::{FetchClient, FetchConfig, Worker, WorkerSettings};
use rentcache_core::{AppConfig, CacheDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let settings = WorkerSettings::from_config(&config)?;
    tracing::info!(
        origin = %config.origin,
        store = %settings.cache.store_name,
        db = %config.db_path.display(),
        "Starting rentcache-sw on stdio transport"
    );

    let db = CacheDb::open(&config.db_path).await?;
    let network = Arc::new(FetchClient::new(FetchConfig::from(&config))?);
    let host = Arc::new(tools::McpHost::new());
    let worker = Arc::new(Worker::new(settings, db.clone(), network, host.clone()));

    let handler = handler::RentCacheServer::new(worker, db, host);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
