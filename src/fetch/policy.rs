//! Request pacing, timeouts, and identity shared by every adapter.

use crate::config::Config;
use rand::Rng;
use std::time::Duration;
use tracing::debug;

/// Browser-like headers sent with every request, in order.
pub const BROWSER_HEADERS: &[(&str, &str)] = &[
    ("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8"),
    ("Accept-Encoding", "gzip, br"),
    ("Cache-Control", "no-cache"),
    ("Pragma", "no-cache"),
    ("DNT", "1"),
    ("Sec-Ch-Ua", "\"Chromium\";v=\"131\", \"Not_A Brand\";v=\"24\""),
    ("Sec-Ch-Ua-Mobile", "?0"),
    ("Sec-Ch-Ua-Platform", "\"Windows\""),
    ("Sec-Fetch-Dest", "document"),
    ("Sec-Fetch-Mode", "navigate"),
    ("Sec-Fetch-Site", "none"),
    ("Sec-Fetch-User", "?1"),
    ("Upgrade-Insecure-Requests", "1"),
];

/// Pacing and transport settings applied before and during each request.
///
/// One policy is built per aggregation run and shared by reference between
/// adapters. It holds no mutable state; cookie sessions live in each
/// adapter's own transport.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchPolicy {
    /// Lower bound of the random pre-request delay
    pub delay_min: Duration,
    /// Upper bound of the random pre-request delay
    pub delay_max: Duration,
    /// Whole-request timeout
    pub timeout: Duration,
    /// TCP/TLS connect timeout
    pub connect_timeout: Duration,
    /// Proxy URL (e.g., socks5://host:port)
    pub proxy: Option<String>,
}

impl FetchPolicy {
    /// Creates a policy with the given delay bounds and timeout.
    pub fn new(delay_min: Duration, delay_max: Duration, timeout: Duration) -> Self {
        let (delay_min, delay_max) =
            if delay_min <= delay_max { (delay_min, delay_max) } else { (delay_max, delay_min) };

        Self {
            delay_min,
            delay_max,
            timeout,
            connect_timeout: timeout.min(Duration::from_secs(10)),
            proxy: None,
        }
    }

    /// Builds the policy from configuration.
    pub fn from_config(config: &Config) -> Self {
        let mut policy = Self::new(
            Duration::from_millis(config.delay_min_ms),
            Duration::from_millis(config.delay_max_ms),
            Duration::from_secs(config.timeout_secs),
        );
        policy.proxy = config.proxy.clone();
        policy
    }

    /// A policy with no delay, for tests and local fixtures.
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO, Duration::from_secs(5))
    }

    /// Picks the next delay uniformly from the configured range.
    pub fn next_delay(&self) -> Duration {
        if self.delay_max.is_zero() {
            return Duration::ZERO;
        }

        let min = self.delay_min.as_millis() as u64;
        let max = self.delay_max.as_millis() as u64;
        Duration::from_millis(rand::rng().random_range(min..=max))
    }

    /// Sleeps for a random, human-like interval.
    pub async fn pause(&self) {
        let delay = self.next_delay();
        if delay.is_zero() {
            return;
        }

        debug!("Delaying {}ms", delay.as_millis());
        tokio::time::sleep(delay).await;
    }
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
