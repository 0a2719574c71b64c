//! In-memory fetcher (testing only).
//!
//! `MemoryFetcher` serves canned JSON documents by URL and records every
//! call, so tests can check ordering and in-flight concurrency without a
//! network.

use super::{FetchStats, JsonFetcher};
use crate::models::{DexError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// One recorded fetch boundary crossing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    Start(String),
    End(String),
}

#[derive(Debug, Clone)]
enum Route {
    Json(Value),
    Status(u16),
    Garbage,
}

/// In-memory `JsonFetcher`. Unknown URLs answer HTTP 404.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    routes: Mutex<HashMap<String, Route>>,
    events: Mutex<Vec<FetchEvent>>,
    /// Scheduler yields between start and end of each fetch
    yields: usize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    failures: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Yield to the scheduler `yields` times inside every fetch, so that
    /// concurrently polled fetches overlap.
    pub fn with_yields(mut self, yields: usize) -> Self {
        self.yields = yields;
        self
    }

    /// Serve `body` at `url`.
    pub fn insert(&self, url: impl Into<String>, body: Value) -> &Self {
        lock(&self.routes).insert(url.into(), Route::Json(body));
        self
    }

    /// Answer `status` at `url`.
    pub fn fail(&self, url: impl Into<String>, status: u16) -> &Self {
        lock(&self.routes).insert(url.into(), Route::Status(status));
        self
    }

    /// Answer an unparseable body at `url`.
    pub fn garbage(&self, url: impl Into<String>) -> &Self {
        lock(&self.routes).insert(url.into(), Route::Garbage);
        self
    }

    /// Every start/end event so far, in order.
    pub fn events(&self) -> Vec<FetchEvent> {
        lock(&self.events).clone()
    }

    /// URLs requested so far, in start order.
    pub fn requested(&self) -> Vec<String> {
        lock(&self.events)
            .iter()
            .filter_map(|e| match e {
                FetchEvent::Start(url) => Some(url.clone()),
                FetchEvent::End(_) => None,
            })
            .collect()
    }

    /// Highest number of fetches observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> FetchStats {
        FetchStats {
            requests: self.requested().len() as u64,
            failures: self.failures.load(Ordering::SeqCst) as u64,
        }
    }

    fn respond(&self, url: &str) -> Result<Value> {
        let route = lock(&self.routes).get(url).cloned();
        match route {
            Some(Route::Json(body)) => Ok(body),
            Some(Route::Status(status)) => Err(DexError::HttpStatus {
                url: url.to_string(),
                status,
            }),
            Some(Route::Garbage) => Err(DexError::parse(url, "expected value at line 1 column 1")),
            None => Err(DexError::HttpStatus {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

#[async_trait]
impl JsonFetcher for MemoryFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value> {
        lock(&self.events).push(FetchEvent::Start(url.to_string()));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        for _ in 0..self.yields {
            tokio::task::yield_now().await;
        }

        let result = self.respond(url);
        if result.is_err() {
            self.failures.fetch_add(1, Ordering::SeqCst);
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        lock(&self.events).push(FetchEvent::End(url.to_string()));
        result
    }
}
