//! Side effects the worker asks of its host runtime.

use serde::{Deserialize, Serialize};
use url::Url;

use rentcache_core::Error;

/// Action id that opens the product listing.
pub const ACTION_VIEW_PRODUCTS: &str = "view-products";
/// Action id that only closes the notification.
pub const ACTION_DISMISS: &str = "dismiss";

const APP_TITLE: &str = "Rental Kamera";
/// Branding image, part of the default precache list.
pub const APP_ICON: &str = "/images/logo.png";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// A user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub tag: String,
    pub actions: Vec<NotificationAction>,
}

impl Notification {
    fn with_default_actions(title: String, body: String, tag: &str) -> Self {
        Self {
            title,
            body,
            icon: APP_ICON.to_string(),
            tag: tag.to_string(),
            actions: vec![
                NotificationAction { action: ACTION_VIEW_PRODUCTS.into(), title: "Lihat Produk".into() },
                NotificationAction { action: ACTION_DISMISS.into(), title: "Tutup".into() },
            ],
        }
    }

    /// Shown after the offline-actions sync ran.
    pub fn sync_complete(replayed: usize) -> Self {
        let body = if replayed == 0 {
            "Koneksi kembali normal.".to_string()
        } else {
            format!("Koneksi kembali normal. {replayed} permintaan tertunda telah dikirim.")
        };
        Self::with_default_actions(APP_TITLE.into(), body, "sync-complete")
    }

    /// Built from a push payload, with defaults for missing fields.
    pub fn from_push(payload: Option<PushPayload>) -> Self {
        let payload = payload.unwrap_or_default();
        Self::with_default_actions(
            payload.title.unwrap_or_else(|| APP_TITLE.into()),
            payload
                .body
                .unwrap_or_else(|| "Ada peralatan baru yang siap disewa.".into()),
            "push",
        )
    }
}

/// Data carried by a push message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushPayload {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// A click on a shown notification or one of its actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationClick {
    pub tag: Option<String>,
    pub action: Option<String>,
}

/// Host runtime capabilities used by the lifecycle and background handlers.
///
/// The host shim is the only code that knows how these map onto a real runtime.
#[async_trait::async_trait]
pub trait WorkerHost: Send + Sync {
    /// Ask to become the active worker without waiting for open pages to close.
    async fn skip_waiting(&self) -> Result<(), Error>;

    /// Take control of every open page.
    async fn claim_clients(&self) -> Result<(), Error>;

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error>;

    async fn close_notification(&self, tag: Option<&str>) -> Result<(), Error>;

    async fn open_window(&self, url: &Url) -> Result<(), Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_complete_actions() {
        let notification = Notification::sync_complete(0);
        let actions: Vec<_> = notification.actions.iter().map(|a| a.action.as_str()).collect();
        assert_eq!(actions, vec![ACTION_VIEW_PRODUCTS, ACTION_DISMISS]);
        assert_eq!(notification.tag, "sync-complete");
        assert_eq!(notification.icon, APP_ICON);
    }

    #[test]
    fn test_sync_complete_mentions_replayed_count() {
        assert!(Notification::sync_complete(3).body.contains('3'));
        assert!(!Notification::sync_complete(0).body.contains('0'));
    }

    #[test]
    fn test_push_payload_defaults() {
        let notification = Notification::from_push(None);
        assert_eq!(notification.title, "Rental Kamera");
        assert_eq!(notification.icon, "/images/logo.png");
        assert!(!notification.body.is_empty());

        let notification = Notification::from_push(Some(PushPayload {
            title: Some("Promo".into()),
            body: Some("Diskon 20% lensa".into()),
        }));
        assert_eq!(notification.title, "Promo");
        assert_eq!(notification.body, "Diskon 20% lensa");
    }
}
