//! Conversion of source-currency amounts into the reference currency.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Reference currency every listing is normalized to.
pub const REFERENCE_CURRENCY: &str = "USD";

/// Static multipliers from a currency code to the reference currency.
///
/// Unknown codes convert with multiplier 1, i.e. they are treated as if they
/// were already in the reference currency. That is an approximation, not an
/// error: the listing is kept rather than silently dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct RateTable {
    rates: BTreeMap<String, f64>,
}

impl RateTable {
    /// Creates an empty table (every code converts 1:1).
    pub fn empty() -> Self {
        Self { rates: BTreeMap::new() }
    }

    /// Adds or replaces the multiplier for `code`.
    pub fn with_rate(mut self, code: &str, multiplier: f64) -> Self {
        self.insert(code, multiplier);
        self
    }

    /// Adds or replaces the multiplier for `code`.
    ///
    /// Multipliers that are not finite and positive are ignored with a
    /// warning, leaving any existing rate for `code` in place.
    pub fn insert(&mut self, code: &str, multiplier: f64) {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            warn!("Ignoring invalid rate {} for {:?}", multiplier, code);
            return;
        }
        self.rates.insert(code.trim().to_uppercase(), multiplier);
    }

    /// Overlays `other` on top of this table.
    pub fn merge(&mut self, other: &RateTable) {
        for (code, rate) in &other.rates {
            self.insert(code, *rate);
        }
    }

    /// Returns the multiplier for `code`, if known.
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(&code.trim().to_uppercase()).copied()
    }

    /// Converts `amount` in `code` into the reference currency.
    pub fn to_reference(&self, amount: f64, code: &str) -> f64 {
        match self.rate(code) {
            Some(rate) => amount * rate,
            None => {
                debug!("No rate for {:?}, treating as {}", code, REFERENCE_CURRENCY);
                amount
            }
        }
    }

    /// Known currency codes, sorted.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.rates.keys().map(String::as_str)
    }
}

impl From<BTreeMap<String, f64>> for RateTable {
    fn from(map: BTreeMap<String, f64>) -> Self {
        let mut table = Self::empty();
        for (code, rate) in map {
            table.insert(&code, rate);
        }
        table
    }
}

impl From<RateTable> for BTreeMap<String, f64> {
    fn from(table: RateTable) -> Self {
        table.rates
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::empty()
            .with_rate("USD", 1.0)
            .with_rate("EUR", 1.11459)
            .with_rate("GBP", 1.31161)
            .with_rate("UZS", 1.0 / 13000.0)
    }
}

/// Detects an explicit, unambiguous currency marker in raw price text.
///
/// A bare `$` is not enough (it is shared by USD, CAD, AUD, ...), so it
/// returns `None` and the caller falls back to the source's currency.
pub fn detect_currency(raw: &str) -> Option<&'static str> {
    let upper = raw.to_uppercase();

    if raw.contains('€') || upper.contains("EUR") {
        Some("EUR")
    } else if raw.contains('£') || upper.contains("GBP") {
        Some("GBP")
    } else if upper.contains("SO'M") || upper.contains("СУМ") || upper.contains("UZS") {
        Some("UZS")
    } else if upper.contains("US$") || upper.contains("US $") || upper.contains("USD") {
        Some("USD")
    } else {
        None
    }
}
