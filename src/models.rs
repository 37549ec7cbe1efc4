//! Data models for listings and aggregation results.

use crate::error::{ItemError, SourceError};
use crate::pricing::{detect_currency, parse_price, RateTable};
use serde::{Deserialize, Serialize};

/// Fields pulled out of one item container, before any normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawListing {
    /// Title text as rendered by the marketplace
    pub title: String,
    /// Price text as rendered by the marketplace
    pub raw_price: String,
    /// Absolute permalink, when one could be resolved
    pub link: Option<String>,
}

impl RawListing {
    pub fn new(title: impl Into<String>, raw_price: impl Into<String>) -> Self {
        Self { title: title.into(), raw_price: raw_price.into(), link: None }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

/// One normalized product offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Product title (never empty)
    pub title: String,
    /// Price text as the source rendered it
    pub raw_price: String,
    /// Parsed price in `currency` (finite, > 0)
    pub price: f64,
    /// Three-letter currency code
    pub currency: String,
    /// `price` converted to the reference currency
    pub price_reference: f64,
    /// Marketplace label, e.g. "Amazon DE"
    pub source: String,
    /// Permalink if the source exposes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Listing {
    /// Validates and normalizes a raw listing.
    ///
    /// The currency comes from a marker in the price text when there is one,
    /// otherwise from `default_currency`.
    pub fn normalize(
        raw: RawListing,
        source: &str,
        default_currency: &str,
        rates: &RateTable,
    ) -> Result<Self, ItemError> {
        let title = raw.title.split_whitespace().collect::<Vec<_>>().join(" ");
        if title.is_empty() {
            return Err(ItemError::MissingTitle);
        }

        let raw_price = raw.raw_price.trim().to_string();
        if raw_price.is_empty() {
            return Err(ItemError::MissingPrice);
        }

        let price =
            parse_price(&raw_price).ok_or_else(|| ItemError::PriceFormat(raw_price.clone()))?;
        if price <= 0.0 {
            return Err(ItemError::NonPositivePrice);
        }

        let currency = detect_currency(&raw_price).unwrap_or(default_currency).to_string();

        let price_reference = rates.to_reference(price, &currency);

        Ok(Self {
            title,
            raw_price,
            price,
            currency,
            price_reference,
            source: source.to_string(),
            link: raw.link,
        })
    }
}

/// Result of running one source adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome {
    /// The adapter completed and produced these listings (possibly none).
    Listings(Vec<Listing>),
    /// The adapter produced nothing, for this reason.
    Failed(SourceError),
}

impl SourceOutcome {
    /// Returns the listings, or an empty vec for a failed outcome.
    pub fn into_listings(self) -> Vec<Listing> {
        match self {
            SourceOutcome::Listings(listings) => listings,
            SourceOutcome::Failed(_) => Vec::new(),
        }
    }
}

/// What happened to one source during an aggregation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceReport {
    /// Marketplace label
    pub source: String,
    /// Number of listings the source contributed before deduplication
    pub listings: usize,
    /// Failure classification, if the source produced nothing
    pub error: Option<SourceError>,
}

/// Summary statistics over reference prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceSummary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl PriceSummary {
    /// Computes a summary over the reference prices of `listings`.
    pub fn of<'a>(listings: impl IntoIterator<Item = &'a Listing>) -> Option<Self> {
        let prices: Vec<f64> = listings.into_iter().map(|l| l.price_reference).collect();
        if prices.is_empty() {
            return None;
        }

        let count = prices.len();
        let sum: f64 = prices.iter().sum();
        let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(Self { count, mean: sum / count as f64, min, max })
    }
}

/// Deduplicated listings sorted by reference price, from one aggregation run.
///
/// Built only by the aggregator and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedResult {
    query: String,
    listings: Vec<Listing>,
    reports: Vec<SourceReport>,
}

impl AggregatedResult {
    pub(crate) fn new(
        query: impl Into<String>,
        listings: Vec<Listing>,
        reports: Vec<SourceReport>,
    ) -> Self {
        Self { query: query.into(), listings, reports }
    }

    /// The query this result answers.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Listings in ascending reference-price order.
    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    /// Per-source outcomes, in adapter order.
    pub fn reports(&self) -> &[SourceReport] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Listing> {
        self.listings.iter()
    }

    pub fn summary(&self) -> Option<PriceSummary> {
        PriceSummary::of(&self.listings)
    }
}

impl<'a> IntoIterator for &'a AggregatedResult {
    type Item = &'a Listing;
    type IntoIter = std::slice::Iter<'a, Listing>;

    fn into_iter(self) -> Self::IntoIter {
        self.listings.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(raw: RawListing, currency: &str) -> Result<Listing, ItemError> {
        Listing::normalize(raw, "Test", currency, &RateTable::default())
    }

    #[test]
    fn test_normalize_basic() {
        let listing = normalize(
            RawListing::new("  Wireless\n  Mouse ", " $19.99 ").with_link("https://x/1"),
            "USD",
        )
        .unwrap();

        assert_eq!(listing.title, "Wireless Mouse");
        assert_eq!(listing.raw_price, "$19.99");
        assert_eq!(listing.price, 19.99);
        assert_eq!(listing.currency, "USD");
        assert_eq!(listing.price_reference, 19.99);
        assert_eq!(listing.source, "Test");
        assert_eq!(listing.link.as_deref(), Some("https://x/1"));
    }

    #[test]
    fn test_normalize_converts_currency() {
        let listing = normalize(RawListing::new("Maus", "100,00"), "EUR").unwrap();
        assert_eq!(listing.currency, "EUR");
        assert_eq!(listing.price, 100.0);
        assert_eq!(listing.price_reference, 100.0 * 1.11459);
    }

    #[test]
    fn test_normalize_currency_precedence() {
        // Marker in the text wins over the default
        let listing = normalize(RawListing::new("A", "£10"), "USD").unwrap();
        assert_eq!(listing.currency, "GBP");
        assert_eq!(listing.price_reference, 10.0 * 1.31161);

        let listing = normalize(RawListing::new("A", "10"), "USD").unwrap();
        assert_eq!(listing.currency, "USD");
    }

    #[test]
    fn test_normalize_unknown_currency() {
        let listing = normalize(RawListing::new("A", "10"), "XYZ").unwrap();
        assert_eq!(listing.currency, "XYZ");
        assert_eq!(listing.price_reference, 10.0);
    }

    #[test]
    fn test_normalize_rejects_bad_items() {
        assert_eq!(normalize(RawListing::new("  ", "10"), "USD"), Err(ItemError::MissingTitle));
        assert_eq!(normalize(RawListing::new("A", " "), "USD"), Err(ItemError::MissingPrice));
        assert_eq!(
            normalize(RawListing::new("A", "N/A"), "USD"),
            Err(ItemError::PriceFormat("N/A".into()))
        );
        assert_eq!(
            normalize(RawListing::new("A", "0.00"), "USD"),
            Err(ItemError::NonPositivePrice)
        );
    }

    #[test]
    fn test_source_outcome() {
        let listing = normalize(RawListing::new("A", "10"), "USD").unwrap();
        let ok = SourceOutcome::Listings(vec![listing]);
        assert_eq!(ok.into_listings().len(), 1);

        let failed = SourceOutcome::Failed(SourceError::Timeout);
        assert!(failed.into_listings().is_empty());
    }

    #[test]
    fn test_price_summary() {
        let rates = RateTable::default();
        let listings: Vec<_> = ["10", "20", "60"]
            .iter()
            .map(|p| Listing::normalize(RawListing::new("A", *p), "S", "USD", &rates).unwrap())
            .collect();

        let summary = PriceSummary::of(&listings).unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.mean, 30.0);
        assert_eq!(summary.min, 10.0);
        assert_eq!(summary.max, 60.0);

        assert!(PriceSummary::of(&Vec::new()).is_none());
    }

    #[test]
    fn test_listing_serde_skips_missing_link() {
        let listing = normalize(RawListing::new("A", "10"), "USD").unwrap();
        let json = serde_json::to_string(&listing).unwrap();
        assert!(!json.contains("link"));
        assert!(json.contains("\"price_reference\":10.0"));

        let parsed: Listing = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, listing);
    }
}
