//! Error types for sources, items, and whole aggregation runs.

use serde::Serialize;
use thiserror::Error;

/// Why a single marketplace produced no listings.
///
/// None of these abort an aggregation run; they are reported per source.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SourceError {
    #[error("network error: {0}")]
    Network(String),

    #[error("rate limited or blocked by the marketplace")]
    RateLimited,

    #[error("page structure not recognized: {0}")]
    Parse(String),

    #[error("timed out before the aggregation deadline")]
    Timeout,

    #[error("no qualifying items found")]
    Empty,
}

impl SourceError {
    /// Short label used in logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceError::Network(_) => "network",
            SourceError::RateLimited => "rate-limited",
            SourceError::Parse(_) => "parse",
            SourceError::Timeout => "timeout",
            SourceError::Empty => "empty",
        }
    }
}

/// Why one item container was skipped. Recovered locally by the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    #[error("missing title")]
    MissingTitle,

    #[error("missing price")]
    MissingPrice,

    #[error("unparseable price: {0:?}")]
    PriceFormat(String),

    #[error("price is not positive")]
    NonPositivePrice,

    #[error("placeholder item")]
    Placeholder,
}

/// Failure of a whole aggregation run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("no results found for '{query}'")]
    NoResults { query: String },
}
