//! Offline fetch cache for the rental storefront.
//!
//! This crate holds the request router, the per-class fetch strategies, the
//! worker lifecycle and the background jobs. The host shim in the server
//! crate drives it through [`RequestRouter`].

pub mod fetch;
pub mod route;
pub mod strategy;
pub mod worker;

#[cfg(test)]
mod testing;

pub use fetch::{FetchClient, FetchConfig, Network};
pub use route::{BypassReason, Classification, Route, Selector};
pub use strategy::{OFFLINE_MARKER, Source, Strategy, StrategyOutcome};
pub use worker::{
    ActivateReport, FetchOutcome, InstallReport, LifecycleState, Notification, NotificationClick,
    PushPayload, RefreshReport, ReplayReport, RequestRouter, Worker, WorkerHost, WorkerSettings,
};
