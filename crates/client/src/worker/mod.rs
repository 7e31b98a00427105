//! The offline fetch cache as one host-agnostic worker.
//!
//! [`RequestRouter`] has one method per host event. The host shim binds its
//! runtime's hooks to these methods and nothing else; the worker never sees
//! the runtime directly.

pub mod host;
pub mod lifecycle;
pub mod queue;
pub mod refresh;

use std::sync::Arc;

use url::Url;

use rentcache_core::{AppConfig, CacheConfig, CacheDb, CacheStore, Error, Request, Response};

use crate::fetch::{Network, resolve, resolve_all};
use crate::route::{BypassReason, Classification, Route, Selector};
use crate::strategy::{
    Source, Strategy, StrategyOutcome, cache_first, lookup, navigation, network_first, offline_fallback,
    service_unavailable,
};

pub use host::{Notification, NotificationAction, NotificationClick, PushPayload, WorkerHost};
pub use lifecycle::{ActivateReport, InstallReport, Lifecycle, LifecycleState};
pub use queue::{OfflineQueue, PendingAction};
pub use refresh::{RefreshFailure, RefreshReport, ReplayReport};

/// One handler per host event.
#[async_trait::async_trait]
pub trait RequestRouter: Send + Sync {
    async fn install(&self) -> Result<InstallReport, Error>;

    async fn activate(&self) -> Result<ActivateReport, Error>;

    async fn fetch(&self, request: Request) -> Result<FetchOutcome, Error>;

    /// One-shot background sync. `None` when the tag is not ours.
    async fn sync(&self, tag: &str) -> Result<Option<ReplayReport>, Error>;

    /// Recurring background sync. `None` when the tag is not ours.
    async fn periodic_sync(&self, tag: &str) -> Result<Option<RefreshReport>, Error>;

    async fn push(&self, payload: Option<PushPayload>) -> Result<Notification, Error>;

    /// Returns the URL opened in response to the click, if any.
    async fn notification_click(&self, click: NotificationClick) -> Result<Option<Url>, Error>;
}

/// Everything the worker needs from configuration, resolved up front.
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub cache: CacheConfig,
    pub selector: Selector,
    pub precache: Vec<Url>,
    pub offline_document: Url,
    pub refresh_endpoints: Vec<Url>,
    pub sync_tag: String,
    pub periodic_sync_tag: String,
    pub products_route: Url,
}

impl WorkerSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let selector = Selector::from_config(config)?;
        let origin = selector.origin().clone();
        let api_base = config.api_base_url().map_err(|e| Error::Config(e.to_string()))?;
        let invalid = |field: &str, e: crate::fetch::UrlError| Error::Config(format!("{field}: {e}"));

        Ok(Self {
            cache: config.cache_config(),
            precache: resolve_all(&origin, &config.precache_assets).map_err(|e| invalid("precache_assets", e))?,
            offline_document: resolve(&origin, &config.offline_document)
                .map_err(|e| invalid("offline_document", e))?,
            refresh_endpoints: resolve_all(&api_base, &config.refresh_endpoints)
                .map_err(|e| invalid("refresh_endpoints", e))?,
            products_route: resolve(&origin, &config.products_route).map_err(|e| invalid("products_route", e))?,
            sync_tag: config.sync_tag.clone(),
            periodic_sync_tag: config.periodic_sync_tag.clone(),
            selector,
        })
    }
}

/// Result of one intercepted (or passed-through) request.
#[derive(Debug)]
pub struct FetchOutcome {
    pub route: Route,
    pub outcome: StrategyOutcome,
}

impl FetchOutcome {
    pub fn response(&self) -> &Response {
        &self.outcome.response
    }

    pub fn source(&self) -> Source {
        self.outcome.source
    }

    /// Wait for any cache write this request started.
    pub async fn settled(self) -> Response {
        self.outcome.settled().await
    }
}

/// The worker for one cache generation.
pub struct Worker {
    settings: WorkerSettings,
    db: CacheDb,
    network: Arc<dyn Network>,
    host: Arc<dyn WorkerHost>,
    lifecycle: Lifecycle,
    queue: OfflineQueue,
}

impl Worker {
    pub fn new(settings: WorkerSettings, db: CacheDb, network: Arc<dyn Network>, host: Arc<dyn WorkerHost>) -> Self {
        Self { settings, db, network, host, lifecycle: Lifecycle::default(), queue: OfflineQueue::new() }
    }

    pub fn settings(&self) -> &WorkerSettings {
        &self.settings
    }

    pub async fn state(&self) -> LifecycleState {
        self.lifecycle.state().await
    }

    pub fn queue(&self) -> &OfflineQueue {
        &self.queue
    }

    /// Handle to the current generation's store.
    pub fn current_store(&self) -> CacheStore {
        self.db.store(&self.settings.cache.store_name)
    }

    fn offline_request(&self) -> Request {
        Request::get(self.settings.offline_document.clone())
    }

    async fn passthrough(&self, request: &Request, reason: BypassReason) -> Result<FetchOutcome, Error> {
        let response = self.network.fetch(request).await?;
        Ok(FetchOutcome { route: Route::Bypass(reason), outcome: StrategyOutcome::new(response, Source::Network) })
    }

    /// Last line of defence: the page gets a usable response, never the error.
    async fn recover(
        &self, request: &Request, classification: Classification, cache: &CacheStore, err: &Error,
    ) -> StrategyOutcome {
        tracing::warn!("{} handler failed for {}: {err}", classification.as_str(), request.describe());

        if classification == Classification::Navigation {
            return offline_fallback(cache, &self.offline_request()).await;
        }
        match lookup(cache, request).await {
            Some(cached) => StrategyOutcome::new(cached, Source::Cache),
            None => StrategyOutcome::new(service_unavailable(), Source::Synthesized),
        }
    }
}

#[async_trait::async_trait]
impl RequestRouter for Worker {
    async fn install(&self) -> Result<InstallReport, Error> {
        self.lifecycle
            .begin(LifecycleState::Uninstalled, LifecycleState::Installing)
            .await?;

        let cache = match self.db.open_store(&self.settings.cache.store_name).await {
            Ok(cache) => cache,
            Err(e) => {
                self.lifecycle.set(LifecycleState::Uninstalled).await;
                return Err(e);
            }
        };

        let report = lifecycle::precache(&self.settings.precache, &cache, self.network.as_ref()).await;
        self.lifecycle.set(LifecycleState::Installed).await;

        if let Err(e) = self.host.skip_waiting().await {
            tracing::warn!("skip_waiting failed: {e}");
        }

        tracing::info!(
            store = %report.store_name,
            cached = report.cached.len(),
            failed = report.failed.len(),
            "install complete"
        );
        Ok(report)
    }

    async fn activate(&self) -> Result<ActivateReport, Error> {
        self.lifecycle
            .begin(LifecycleState::Installed, LifecycleState::Activating)
            .await?;

        let evicted = match lifecycle::evict_stale(&self.db, &self.settings.cache).await {
            Ok(evicted) => evicted,
            Err(e) => {
                self.lifecycle.set(LifecycleState::Installed).await;
                return Err(e);
            }
        };

        if let Err(e) = self.host.claim_clients().await {
            tracing::warn!("claim_clients failed: {e}");
        }
        self.lifecycle.set(LifecycleState::Active).await;

        Ok(ActivateReport { store_name: self.settings.cache.store_name.clone(), evicted })
    }

    async fn fetch(&self, request: Request) -> Result<FetchOutcome, Error> {
        if self.lifecycle.state().await != LifecycleState::Active {
            return self.passthrough(&request, BypassReason::Uncontrolled).await;
        }

        let classification = match self.settings.selector.route(&request) {
            Route::Bypass(reason) => return self.passthrough(&request, reason).await,
            Route::Intercept(classification) => classification,
        };

        let cache = self.current_store();
        let network = self.network.as_ref();
        let result = match Strategy::from(classification) {
            Strategy::NetworkFirst => network_first(&request, &cache, network).await,
            Strategy::CacheFirst => cache_first(&request, &cache, network).await,
            Strategy::NavigationFallback => navigation(&request, &cache, network, &self.offline_request()).await,
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => self.recover(&request, classification, &cache, &err).await,
        };

        Ok(FetchOutcome { route: Route::Intercept(classification), outcome })
    }

    async fn sync(&self, tag: &str) -> Result<Option<ReplayReport>, Error> {
        if tag != self.settings.sync_tag {
            tracing::debug!("ignoring sync tag {tag}");
            return Ok(None);
        }

        let report = refresh::replay_pending(&self.queue, self.network.as_ref()).await;
        if let Err(e) = self
            .host
            .show_notification(&Notification::sync_complete(report.replayed.len()))
            .await
        {
            tracing::warn!("sync notification failed: {e}");
        }
        Ok(Some(report))
    }

    async fn periodic_sync(&self, tag: &str) -> Result<Option<RefreshReport>, Error> {
        if tag != self.settings.periodic_sync_tag {
            tracing::debug!("ignoring periodic sync tag {tag}");
            return Ok(None);
        }

        let cache = self.db.open_store(&self.settings.cache.store_name).await?;
        let report = refresh::refresh_endpoints(&self.settings.refresh_endpoints, &cache, self.network.as_ref()).await;
        Ok(Some(report))
    }

    async fn push(&self, payload: Option<PushPayload>) -> Result<Notification, Error> {
        let notification = Notification::from_push(payload);
        self.host.show_notification(&notification).await?;
        Ok(notification)
    }

    async fn notification_click(&self, click: NotificationClick) -> Result<Option<Url>, Error> {
        self.host.close_notification(click.tag.as_deref()).await?;

        let target = match click.action.as_deref() {
            Some(host::ACTION_DISMISS) => None,
            Some(host::ACTION_VIEW_PRODUCTS) => Some(self.settings.products_route.clone()),
            Some(other) => {
                tracing::debug!("unknown notification action {other}");
                None
            }
            None => Some(self.settings.selector.origin().clone()),
        };

        if let Some(url) = &target {
            self.host.open_window(url).await?;
        }
        Ok(target)
    }
}
