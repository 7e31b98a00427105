//! Actions recorded while offline, replayed on the connectivity sync.
//!
//! The queue lives in memory only. Nothing in the request path enqueues on
//! its own; callers that want replay put requests here explicitly.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use rentcache_core::Request;

#[derive(Debug, Clone, Serialize)]
pub struct PendingAction {
    pub id: u64,
    pub request: Request,
    pub queued_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct OfflineQueue {
    next_id: AtomicU64,
    actions: Mutex<VecDeque<PendingAction>>,
}

impl OfflineQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `request`, returning its id.
    pub async fn enqueue(&self, request: Request) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(id, "queued offline action {}", request.describe());
        self.actions
            .lock()
            .await
            .push_back(PendingAction { id, request, queued_at: Utc::now() });
        id
    }

    pub async fn len(&self) -> usize {
        self.actions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.actions.lock().await.is_empty()
    }

    /// Snapshot of queued actions, oldest first.
    pub async fn pending(&self) -> Vec<PendingAction> {
        self.actions.lock().await.iter().cloned().collect()
    }

    /// Remove and return everything queued so far.
    pub(crate) async fn take_all(&self) -> Vec<PendingAction> {
        self.actions.lock().await.drain(..).collect()
    }

    /// Put failed actions back ahead of anything queued since `take_all`.
    pub(crate) async fn requeue_front(&self, failed: Vec<PendingAction>) {
        let mut actions = self.actions.lock().await;
        for action in failed.into_iter().rev() {
            actions.push_front(action);
        }
    }
}
