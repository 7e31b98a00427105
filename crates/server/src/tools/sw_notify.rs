//! sw_push and sw_notification_click tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use rentcache_client::{Notification, NotificationClick, PushPayload, RequestRouter, Worker};

use super::{HostEvent, McpHost, json_result};

/// Input parameters for sw_push tool. Both fields fall back to defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SwPushParams {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// Input parameters for sw_notification_click tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SwNotificationClickParams {
    /// Tag of the clicked notification.
    #[serde(default)]
    pub tag: Option<String>,

    /// Action id ("view-products" or "dismiss"); absent for a click on the body.
    #[serde(default)]
    pub action: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SwPushOutput {
    pub notification: Notification,
    pub host_events: Vec<HostEvent>,
}

#[derive(Debug, Serialize)]
pub struct SwNotificationClickOutput {
    pub opened: Option<String>,
    pub host_events: Vec<HostEvent>,
}

pub async fn push_impl(worker: &Worker, host: &McpHost, params: SwPushParams) -> Result<CallToolResult, McpError> {
    let payload = match (params.title, params.body) {
        (None, None) => None,
        (title, body) => Some(PushPayload { title, body }),
    };
    let (notification, host_events) = host.capture(worker.push(payload)).await;
    json_result(&SwPushOutput { notification: notification?, host_events })
}

pub async fn notification_click_impl(
    worker: &Worker, host: &McpHost, params: SwNotificationClickParams,
) -> Result<CallToolResult, McpError> {
    let click = NotificationClick { tag: params.tag, action: params.action };
    let (opened, host_events) = host.capture(worker.notification_click(click)).await;
    json_result(&SwNotificationClickOutput { opened: opened?.map(|u| u.to_string()), host_events })
}
