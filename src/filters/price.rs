//! Reference-price range filter.

use super::Filter;
use crate::models::Listing;
use crate::pricing::REFERENCE_CURRENCY;

/// Filters listings by their reference-currency price, bounds inclusive.
pub struct PriceFilter {
    min: Option<f64>,
    max: Option<f64>,
}

impl PriceFilter {
    /// Creates a new price filter with optional min/max bounds.
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Creates a filter with only minimum price.
    pub fn min(price: f64) -> Self {
        Self { min: Some(price), max: None }
    }

    /// Creates a filter with only maximum price.
    pub fn max(price: f64) -> Self {
        Self { min: None, max: Some(price) }
    }

    /// Creates a filter with both min and max.
    pub fn range(min: f64, max: f64) -> Self {
        Self { min: Some(min), max: Some(max) }
    }
}

impl Filter for PriceFilter {
    fn matches(&self, listing: &Listing) -> bool {
        let price = listing.price_reference;

        if self.min.is_some_and(|min| price < min) {
            return false;
        }

        if self.max.is_some_and(|max| price > max) {
            return false;
        }

        true
    }

    fn description(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => {
                format!("Price: {:.2} - {:.2} {}", min, max, REFERENCE_CURRENCY)
            }
            (Some(min), None) => format!("Price: >= {:.2} {}", min, REFERENCE_CURRENCY),
            (None, Some(max)) => format!("Price: <= {:.2} {}", max, REFERENCE_CURRENCY),
            (None, None) => "Price: any".to_string(),
        }
    }
}
