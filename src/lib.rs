//! price-compare - multi-marketplace product price aggregation
//!
//! Searches several marketplaces concurrently, parses locale-formatted
//! prices, normalizes them to USD, and returns one deduplicated list
//! sorted from cheapest to most expensive.

pub mod aggregator;
pub mod commands;
pub mod config;
pub mod error;
pub mod fetch;
pub mod filters;
pub mod format;
pub mod models;
pub mod pricing;
pub mod sources;

pub use aggregator::Aggregator;
pub use config::Config;
pub use error::{AggregateError, ItemError, SourceError};
pub use models::{AggregatedResult, Listing, RawListing, SourceOutcome, SourceReport};
pub use pricing::{parse_price, RateTable};
pub use sources::{Marketplace, MarketplaceAdapter, SourceAdapter};
