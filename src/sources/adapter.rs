//! Source adapters: query in, normalized listings out.

use super::extract::extract_page;
use super::marketplace::Marketplace;
use crate::error::SourceError;
use crate::fetch::{FetchPolicy, HttpTransport, Transport};
use crate::models::{Listing, SourceOutcome};
use crate::pricing::RateTable;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// One marketplace, as seen by the aggregator.
///
/// `fetch` never fails outright: every problem is folded into
/// [`SourceOutcome::Failed`] so other sources are unaffected.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Source label stamped on the listings this adapter produces.
    fn name(&self) -> &str;

    /// Searches the marketplace for `query`.
    async fn fetch(&self, query: &str) -> SourceOutcome;
}

/// Adapter for a catalogued [`Marketplace`].
pub struct MarketplaceAdapter {
    marketplace: Marketplace,
    label: String,
    base_url: String,
    policy: Arc<FetchPolicy>,
    rates: Arc<RateTable>,
    transport: Box<dyn Transport>,
}

impl MarketplaceAdapter {
    /// Creates an adapter with its own HTTP session.
    pub fn new(
        marketplace: Marketplace,
        policy: Arc<FetchPolicy>,
        rates: Arc<RateTable>,
    ) -> Result<Self> {
        let transport = HttpTransport::new(&policy, marketplace.accept_language())?;
        Ok(Self::with_transport(marketplace, policy, rates, Box::new(transport)))
    }

    /// Creates an adapter over a caller-supplied transport.
    pub fn with_transport(
        marketplace: Marketplace,
        policy: Arc<FetchPolicy>,
        rates: Arc<RateTable>,
        transport: Box<dyn Transport>,
    ) -> Self {
        Self {
            marketplace,
            label: marketplace.label(),
            base_url: marketplace.base_url(),
            policy,
            rates,
            transport,
        }
    }

    /// Overrides the base URL (for local fixtures and tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Candidate search URLs for `query`, in the order they are tried.
    pub fn search_urls(&self, query: &str) -> Vec<String> {
        self.marketplace
            .search_paths(query)
            .into_iter()
            .map(|path| format!("{}{}", self.base_url, path))
            .collect()
    }

    /// Extracts and normalizes the listings on one page.
    fn listings_from(&self, html: &str) -> Result<Vec<Listing>, SourceError> {
        let page = extract_page(html, &self.marketplace.rules(), &self.base_url)?;
        let currency = self.marketplace.currency();

        let listings: Vec<Listing> = page
            .items
            .into_iter()
            .filter_map(|raw| match Listing::normalize(raw, &self.label, currency, &self.rates) {
                Ok(listing) => Some(listing),
                Err(e) => {
                    trace!("{}: skipping item: {}", self.label, e);
                    None
                }
            })
            .collect();

        debug!(
            "{}: {} of {} containers produced listings",
            self.label,
            listings.len(),
            page.containers
        );
        Ok(listings)
    }
}

#[async_trait]
impl SourceAdapter for MarketplaceAdapter {
    fn name(&self) -> &str {
        &self.label
    }

    async fn fetch(&self, query: &str) -> SourceOutcome {
        info!("Searching {} for: {}", self.label, query);

        let mut last_error = None;

        for url in self.search_urls(query) {
            self.policy.pause().await;

            let html = match self.transport.get(&url).await {
                Ok(html) => html,
                Err(SourceError::RateLimited) => {
                    last_error = Some(SourceError::RateLimited);
                    break;
                }
                Err(e) => {
                    warn!("{}: request failed: {}", self.label, e);
                    last_error = Some(e);
                    continue;
                }
            };

            match self.listings_from(&html) {
                Ok(listings) if !listings.is_empty() => {
                    info!("{}: found {} listings", self.label, listings.len());
                    return SourceOutcome::Listings(listings);
                }
                Ok(_) => {
                    debug!("{}: no qualifying items at {}", self.label, url);
                    last_error = Some(SourceError::Empty);
                }
                Err(SourceError::RateLimited) => {
                    warn!("{}: blocked by CAPTCHA page", self.label);
                    last_error = Some(SourceError::RateLimited);
                    break;
                }
                Err(e) => {
                    debug!("{}: {} at {}", self.label, e, url);
                    last_error = Some(e);
                }
            }
        }

        SourceOutcome::Failed(last_error.unwrap_or(SourceError::Empty))
    }
}
