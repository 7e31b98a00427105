//! sw_install and sw_activate tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use serde::Serialize;

use rentcache_client::{ActivateReport, InstallReport, LifecycleState, RequestRouter, Worker};

use super::{HostEvent, McpHost, json_result};

#[derive(Debug, Serialize)]
pub struct InstallOutput {
    pub state: LifecycleState,
    pub report: InstallReport,
    pub host_events: Vec<HostEvent>,
}

#[derive(Debug, Serialize)]
pub struct ActivateOutput {
    pub state: LifecycleState,
    pub report: ActivateReport,
    pub host_events: Vec<HostEvent>,
}

/// Run the install handler: open the current store and precache assets.
pub async fn install_impl(worker: &Worker, host: &McpHost) -> Result<CallToolResult, McpError> {
    let (report, host_events) = host.capture(worker.install()).await;
    let output = InstallOutput { state: worker.state().await, report: report?, host_events };
    json_result(&output)
}

/// Run the activate handler: drop stale generations and take control.
pub async fn activate_impl(worker: &Worker, host: &McpHost) -> Result<CallToolResult, McpError> {
    let (report, host_events) = host.capture(worker.activate()).await;
    let output = ActivateOutput { state: worker.state().await, report: report?, host_events };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::fixtures::{fixture, output};

    #[tokio::test]
    async fn test_install_then_activate() {
        let f = fixture().await;
        f.db.open_store("rental-storefront-v0").await.unwrap();

        let installed = output(&install_impl(&f.worker, &f.host).await.unwrap());
        assert_eq!(installed["state"], "installed");
        assert_eq!(installed["report"]["store_name"], "rental-storefront-v1");
        assert_eq!(installed["host_events"][0]["effect"], "skip_waiting");

        let activated = output(&activate_impl(&f.worker, &f.host).await.unwrap());
        assert_eq!(activated["state"], "active");
        assert_eq!(activated["report"]["evicted"][0], "rental-storefront-v0");
        assert_eq!(activated["host_events"][0]["effect"], "claim_clients");
    }

    #[tokio::test]
    async fn test_activate_before_install_is_rejected() {
        let f = fixture().await;
        let err = activate_impl(&f.worker, &f.host).await.unwrap_err();
        assert_eq!(err.code.0, -32009);
    }
}
