//! Test doubles shared by the in-crate tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use url::Url;

use rentcache_core::{CacheDb, CacheStore, Error, Method, Request, RequestMode, Response};

use crate::fetch::Network;
use crate::worker::{Notification, WorkerHost};

pub const ORIGIN: &str = "https://shop.test";
pub const STORE: &str = "rental-storefront-v1";

pub fn url(path: &str) -> Url {
    Url::parse(ORIGIN).unwrap().join(path).unwrap()
}

pub fn get(path: &str) -> Request {
    Request::get(url(path))
}

pub fn navigate(path: &str) -> Request {
    Request::navigate(url(path))
}

pub fn post(path: &str, body: &str) -> Request {
    Request::new(Method::Post, url(path), RequestMode::Cors)
        .with_header("content-type", "application/json")
        .with_body(body)
}

/// In-memory database with the v1 store already opened.
pub async fn store() -> CacheStore {
    let db = CacheDb::open_in_memory().await.unwrap();
    db.open_store(STORE).await.unwrap()
}

/// Scripted network. Unknown URLs answer 404; failed URLs and everything
/// while offline answer a network error.
#[derive(Default)]
pub struct MockNetwork {
    responses: Mutex<HashMap<String, Response>>,
    failing: Mutex<HashSet<String>>,
    offline: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, path: &str, response: Response) {
        let key = url(path).to_string();
        self.failing.lock().unwrap().remove(&key);
        self.responses.lock().unwrap().insert(key, response);
    }

    pub fn fail(&self, path: &str) {
        self.failing.lock().unwrap().insert(url(path).to_string());
    }

    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub fn go_online(&self) {
        self.offline.store(false, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Network for MockNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let key = request.url.to_string();
        self.calls.lock().unwrap().push(key.clone());

        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("offline: {key}")));
        }
        if self.failing.lock().unwrap().contains(&key) {
            return Err(Error::Network(format!("connection reset: {key}")));
        }
        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Response::new(404, "not found")))
    }
}

/// Host that records every side effect it is asked for.
#[derive(Default)]
pub struct RecordingHost {
    pub skipped_waiting: AtomicBool,
    pub claimed: AtomicBool,
    pub fail_notifications: AtomicBool,
    pub shown: Mutex<Vec<Notification>>,
    pub closed: Mutex<Vec<Option<String>>>,
    pub opened: Mutex<Vec<Url>>,
}

#[async_trait::async_trait]
impl WorkerHost for RecordingHost {
    async fn skip_waiting(&self) -> Result<(), Error> {
        self.skipped_waiting.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn claim_clients(&self) -> Result<(), Error> {
        self.claimed.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error> {
        if self.fail_notifications.load(Ordering::SeqCst) {
            return Err(Error::InvalidState("notification permission denied".into()));
        }
        self.shown.lock().unwrap().push(notification.clone());
        Ok(())
    }

    async fn close_notification(&self, tag: Option<&str>) -> Result<(), Error> {
        self.closed.lock().unwrap().push(tag.map(str::to_string));
        Ok(())
    }

    async fn open_window(&self, url: &Url) -> Result<(), Error> {
        self.opened.lock().unwrap().push(url.clone());
        Ok(())
    }
}
