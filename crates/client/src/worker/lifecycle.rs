//! Install and activate transitions.
//!
//! ```text
//! uninstalled → installing → installed (waiting) → activating → active
//! ```
//!
//! Install pre-populates the current store on a best-effort basis. Activate
//! drops every other store wholesale; entries inside the current generation
//! are never evicted individually.

use std::fmt;

use serde::Serialize;
use tokio::sync::RwLock;
use url::Url;

use rentcache_core::{CacheConfig, CacheDb, CacheStore, Error, Request};

use crate::fetch::Network;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Uninstalled,
    Installing,
    Installed,
    Activating,
    Active,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Uninstalled => "uninstalled",
            LifecycleState::Installing => "installing",
            LifecycleState::Installed => "installed",
            LifecycleState::Activating => "activating",
            LifecycleState::Active => "active",
        };
        f.write_str(name)
    }
}

/// Current lifecycle state behind a lock.
#[derive(Debug)]
pub struct Lifecycle {
    state: RwLock<LifecycleState>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self { state: RwLock::new(LifecycleState::Uninstalled) }
    }
}

impl Lifecycle {
    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    /// Move `from → to`, failing if the current state is not `from`.
    pub(crate) async fn begin(&self, from: LifecycleState, to: LifecycleState) -> Result<(), Error> {
        let mut state = self.state.write().await;
        if *state != from {
            return Err(Error::InvalidState(format!("cannot enter {to} from {}, expected {from}", *state)));
        }
        tracing::info!("worker lifecycle: {from} -> {to}");
        *state = to;
        Ok(())
    }

    pub(crate) async fn set(&self, to: LifecycleState) {
        let mut state = self.state.write().await;
        tracing::info!("worker lifecycle: {} -> {to}", *state);
        *state = to;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub store_name: String,
    pub cached: Vec<String>,
    pub failed: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivateReport {
    pub store_name: String,
    pub evicted: Vec<String>,
}

/// Fetch each asset into `cache`. A failing asset is logged and skipped.
pub async fn precache(assets: &[Url], cache: &CacheStore, network: &dyn Network) -> InstallReport {
    let mut report = InstallReport { store_name: cache.name().to_string(), ..Default::default() };

    for asset in assets {
        let request = Request::get(asset.clone());
        let result = match network.fetch(&request).await {
            Ok(response) if response.is_success() => cache.put(&request, &response).await,
            Ok(response) => Err(Error::NotCacheable(format!("status {}", response.status))),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => report.cached.push(asset.to_string()),
            Err(e) => {
                tracing::warn!("failed to precache {asset}: {e}");
                report.failed.push(asset.to_string());
            }
        }
    }

    report
}

/// Delete every store that is not the current generation's.
pub async fn evict_stale(db: &CacheDb, current: &CacheConfig) -> Result<Vec<String>, Error> {
    let mut evicted = Vec::new();
    for name in db.store_names().await? {
        if name == current.store_name {
            continue;
        }
        if db.delete_store(&name).await? {
            tracing::info!("evicted stale cache generation {name}");
            evicted.push(name);
        }
    }
    Ok(evicted)
}
