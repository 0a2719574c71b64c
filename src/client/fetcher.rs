//! Resource fetcher: one GET, one JSON body.
//!
//! Epistemic foundation:
//! - K_i: Catalog resources are JSON documents addressed by URL
//! - B_i: The request completes (might fail, might hang without a timeout)
//! - B_i: The body is valid JSON (might fail)
//! - I^B: No retry. Failures are logged here and handed back to the caller

use crate::models::{CatalogConfig, DexError, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// Source of JSON documents.
///
/// Injected into the resolver and assembler so the pipeline never reaches
/// for a global client.
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    /// GET `url` and parse the body.
    ///
    /// Errors are always in the transport-or-parse family
    /// (see [`DexError::is_transport_or_parse`]).
    async fn fetch_json(&self, url: &str) -> Result<serde_json::Value>;
}

/// Request counters for a fetcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    pub requests: u64,
    pub failures: u64,
}

/// HTTP fetcher over `reqwest`.
pub struct HttpFetcher {
    client: reqwest::Client,
    /// Request timeout (None waits forever)
    timeout: Option<Duration>,
    requests: AtomicU64,
    failures: AtomicU64,
}

impl HttpFetcher {
    /// Create a new fetcher.
    ///
    /// # Arguments
    /// - `user_agent`: Value of the User-Agent header
    /// - `timeout`: Per-request timeout, or None to wait indefinitely
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let agent = HeaderValue::from_str(user_agent)
            .map_err(|e| DexError::InvalidInput(format!("user agent: {e}")))?;
        headers.insert(USER_AGENT, agent);

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(DexError::Transport)?;

        Ok(Self {
            client,
            timeout,
            requests: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        })
    }

    /// Create a fetcher from the catalog section of the config.
    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        Self::new(&config.user_agent, config.timeout())
    }

    /// Get request counters.
    pub fn stats(&self) -> FetchStats {
        FetchStats {
            requests: self.requests.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }

    async fn get(&self, url: &str) -> Result<serde_json::Value> {
        let response = self.client.get(url).send().await.map_err(|e| {
            match self.timeout.filter(|_| e.is_timeout()) {
                Some(timeout) => DexError::Timeout(timeout),
                None => DexError::Transport(e),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DexError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(DexError::Transport)?;
        serde_json::from_str(&body).map_err(|e| DexError::parse(url, e))
    }
}

#[async_trait]
impl JsonFetcher for HttpFetcher {
    async fn fetch_json(&self, url: &str) -> Result<serde_json::Value> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        debug!(url = url, "GET");

        let result = self.get(url).await;
        if let Err(e) = &result {
            self.failures.fetch_add(1, Ordering::Relaxed);
            warn!(url = url, error = %e, "Error fetching data");
        }
        result
    }
}
