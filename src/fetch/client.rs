//! HTTP transport using wreq for TLS fingerprint emulation.

use super::policy::{FetchPolicy, BROWSER_HEADERS};
use crate::error::SourceError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, warn};
use wreq::Client;
use wreq_util::Emulation;

/// Fetches a page body - enables stub transports in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GETs `url` and returns the response body.
    async fn get(&self, url: &str) -> Result<String, SourceError>;
}

/// Browser-impersonating HTTP session.
///
/// Each adapter owns one, so cookies set by a marketplace stay with the
/// adapter that talks to it for the rest of the run.
pub struct HttpTransport {
    client: Client,
    accept_language: String,
}

impl HttpTransport {
    /// Creates a new session configured from `policy`.
    pub fn new(policy: &FetchPolicy, accept_language: impl Into<String>) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(policy.timeout)
            .connect_timeout(policy.connect_timeout);

        if let Some(proxy_url) = &policy.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { client, accept_language: accept_language.into() })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String, SourceError> {
        debug!("GET {}", url);

        let mut request = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept-Language", self.accept_language.as_str());

        for (name, value) in BROWSER_HEADERS {
            request = request.header(*name, *value);
        }

        let response =
            request.send().await.map_err(|e| SourceError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == 503 || status == 429 {
            warn!("Rate limited ({}) by {}", status, url);
            return Err(SourceError::RateLimited);
        }

        if !status.is_success() {
            return Err(SourceError::Network(format!("request failed with status: {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("failed to read response body: {e}")))
    }
}
