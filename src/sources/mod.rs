//! Marketplace source adapters and their extraction rules.

pub mod adapter;
pub mod extract;
pub mod marketplace;
pub mod selectors;

pub use adapter::{MarketplaceAdapter, SourceAdapter};
pub use extract::{extract_page, ExtractRules, FieldRule, Page};
pub use marketplace::{resolve_sources, AmazonRegion, Marketplace, MarketplaceParseError};
