// SPDX-License-Identifier: Apache-2.0

//! A small, stateless HTTP query client shared by every distributor
//! adapter.
//!
//! Mirrors the shape of the teacher's globally-constructed `ureq` agent
//! (one client built once, reused for every call), but built on `reqwest`
//! so the blocking I/O doesn't tie up a Tokio worker thread.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::time::Duration;

const DEFAULT_BODY_CAP_BYTES: usize = 20 * 1024 * 1024;
const DEFAULT_USER_AGENT: &str = concat!("license-lookup/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct QueryClientConfig {
    pub user_agent: String,
    pub body_cap_bytes: usize,
    pub timeout: Duration,
}

impl Default for QueryClientConfig {
    fn default() -> Self {
        QueryClientConfig {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            body_cap_bytes: DEFAULT_BODY_CAP_BYTES,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// The response of a [`QueryClient::query`] call: a status code plus a body
/// buffered (and capped) eagerly, so callers can both decode it and log a
/// truncated copy without re-reading the network.
#[derive(Debug, Clone)]
pub struct QueryResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    truncated: bool,
}

impl QueryResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn was_truncated(&self) -> bool {
        self.truncated
    }

    pub fn body_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// A capped copy of the body suitable for logging, never more than
    /// `limit` bytes.
    pub fn logging_excerpt(&self, limit: usize) -> String {
        let end = limit.min(self.body.len());
        String::from_utf8_lossy(&self.body[..end]).into_owned()
    }
}

/// The stateless client every distributor adapter is built with.
///
/// `query` is idempotent and never retries; status codes are returned to
/// the caller uninterpreted so the adapter can apply its own
/// not-found-disambiguation rules.
#[derive(Clone)]
pub struct QueryClient {
    client: Client,
    config: QueryClientConfig,
}

impl QueryClient {
    pub fn new(config: QueryClientConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(QueryClient { client, config })
    }

    /// Perform a GET request, injecting `User-Agent` if the caller didn't
    /// supply one, and capping the buffered body at the configured
    /// ceiling.
    pub async fn query(
        &self,
        url: &str,
        headers: HeaderMap,
    ) -> Result<QueryResponse, reqwest::Error> {
        let mut headers = headers;
        if !headers.contains_key(USER_AGENT) {
            headers.insert(
                USER_AGENT,
                HeaderValue::from_str(&self.config.user_agent)
                    .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
            );
        }

        let response = self.client.get(url).headers(headers).send().await?;
        let status = response.status();

        let cap = self.config.body_cap_bytes;
        let mut body = Vec::with_capacity(cap.min(64 * 1024));
        let mut truncated = false;
        let mut stream = response.bytes_stream();

        use futures::StreamExt;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if body.len() + chunk.len() > cap {
                let remaining = cap.saturating_sub(body.len());
                body.extend_from_slice(&chunk[..remaining]);
                truncated = true;
                break;
            }
            body.extend_from_slice(&chunk);
        }

        Ok(QueryResponse {
            status,
            body,
            truncated,
        })
    }

    /// Convenience wrapper over [`Self::query`] for callers with no custom
    /// headers to set.
    pub async fn get(&self, url: &str) -> Result<QueryResponse, reqwest::Error> {
        self.query(url, HeaderMap::new()).await
    }

    pub fn header(name: &'static str, value: &str) -> Option<(HeaderName, HeaderValue)> {
        let name = HeaderName::from_static(name);
        HeaderValue::from_str(value).ok().map(|v| (name, v))
    }
}
