//! Host side effects for an MCP-driven worker.
//!
//! There is no browser behind this server, so every effect the worker asks
//! for is logged and recorded. Tools run each event through
//! [`McpHost::capture`] so the caller sees what a real host would have done
//! for that event and no other.

use std::future::Future;
use std::sync::Mutex;

use rentcache_client::Notification;
use rentcache_client::WorkerHost;
use rentcache_core::Error;
use schemars::JsonSchema;
use serde::Serialize;
use url::Url;

/// One recorded host effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum HostEvent {
    SkipWaiting,
    ClaimClients,
    ShowNotification { title: String, body: String, icon: String, tag: String, actions: Vec<String> },
    CloseNotification { tag: Option<String> },
    OpenWindow { url: String },
}

#[derive(Debug, Default)]
pub struct McpHost {
    events: Mutex<Vec<HostEvent>>,
    /// Held for the whole of one captured event.
    turn: tokio::sync::Mutex<()>,
}

impl McpHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, event: HostEvent) {
        tracing::info!(?event, "host effect");
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }

    /// Run `event` with no other captured event in flight and return its
    /// output together with the effects it caused.
    pub async fn capture<F: Future>(&self, event: F) -> (F::Output, Vec<HostEvent>) {
        let _turn = self.turn.lock().await;
        let stale = self.drain();
        if !stale.is_empty() {
            tracing::debug!(count = stale.len(), "discarding effects recorded outside a captured event");
        }
        let output = event.await;
        (output, self.drain())
    }

    /// Take everything recorded since the last drain.
    pub fn drain(&self) -> Vec<HostEvent> {
        match self.events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

#[async_trait::async_trait]
impl WorkerHost for McpHost {
    async fn skip_waiting(&self) -> Result<(), Error> {
        self.record(HostEvent::SkipWaiting);
        Ok(())
    }

    async fn claim_clients(&self) -> Result<(), Error> {
        self.record(HostEvent::ClaimClients);
        Ok(())
    }

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error> {
        self.record(HostEvent::ShowNotification {
            title: notification.title.clone(),
            body: notification.body.clone(),
            icon: notification.icon.clone(),
            tag: notification.tag.clone(),
            actions: notification.actions.iter().map(|a| a.action.clone()).collect(),
        });
        Ok(())
    }

    async fn close_notification(&self, tag: Option<&str>) -> Result<(), Error> {
        self.record(HostEvent::CloseNotification { tag: tag.map(str::to_string) });
        Ok(())
    }

    async fn open_window(&self, url: &Url) -> Result<(), Error> {
        self.record(HostEvent::OpenWindow { url: url.to_string() });
        Ok(())
    }
}
