//! In-crate stubs for the network and host boundaries.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use stalecache_core::{CacheVersion, Error, Network, Request, Response};
use url::Url;

use crate::host::{ClientAction, Clients, Notification, Notifier};

/// Network double. Unknown URLs fail like an unreachable server.
#[derive(Default)]
pub struct StubNetwork {
    replies: Mutex<HashMap<String, Option<Response>>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

fn key(url: &str) -> String {
    Url::parse(url).map(|u| u.to_string()).unwrap_or_else(|_| url.to_string())
}

impl StubNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, response: Response) {
        self.replies.lock().unwrap().insert(key(url), Some(response));
    }

    pub fn fail(&self, url: &str) {
        self.replies.lock().unwrap().insert(key(url), None);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Network for StubNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let url = request.url().to_string();
        self.seen.lock().unwrap().push(format!("{} {}", request.method(), url));
        match self.replies.lock().unwrap().get(&url) {
            Some(Some(response)) => Ok(response.clone()),
            _ => Err(Error::Network(format!("connection refused: {url}"))),
        }
    }
}

/// Clients + notifier double that records every call.
#[derive(Default)]
pub struct RecordingHost {
    pub claims: Mutex<Vec<String>>,
    pub opened: Mutex<Vec<String>>,
    pub windows: Mutex<Vec<String>>,
    pub shown: Mutex<Vec<Notification>>,
    pub closed: Mutex<Vec<String>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(url: &str) -> Self {
        let host = Self::default();
        host.windows.lock().unwrap().push(url.to_string());
        host
    }
}

#[async_trait]
impl Clients for RecordingHost {
    async fn claim(&self, version: &CacheVersion) -> Result<usize, Error> {
        self.claims.lock().unwrap().push(version.to_string());
        Ok(self.windows.lock().unwrap().len())
    }

    async fn focus_or_open(&self, url: &Url) -> Result<ClientAction, Error> {
        let mut windows = self.windows.lock().unwrap();
        if windows.iter().any(|w| w == url.as_str()) {
            return Ok(ClientAction::Focused);
        }
        windows.push(url.to_string());
        self.opened.lock().unwrap().push(url.to_string());
        Ok(ClientAction::Opened)
    }
}

#[async_trait]
impl Notifier for RecordingHost {
    async fn show(&self, notification: &Notification) -> Result<(), Error> {
        self.shown.lock().unwrap().push(notification.clone());
        Ok(())
    }

    async fn close(&self, tag: &str) -> Result<(), Error> {
        self.closed.lock().unwrap().push(tag.to_string());
        Ok(())
    }
}
