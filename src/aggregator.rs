//! Fan-out over source adapters, then merge, dedup, and sort.

use crate::error::{AggregateError, SourceError};
use crate::models::{AggregatedResult, Listing, SourceOutcome, SourceReport};
use crate::sources::SourceAdapter;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

/// Runs every adapter for a query and combines their listings.
///
/// Adapter order is significant: when two sources report the same title at
/// the same reference price, the listing from the earlier adapter is kept.
pub struct Aggregator {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    deadline: Option<Duration>,
}

impl Aggregator {
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        Self { adapters, deadline: None }
    }

    /// Bounds the whole run; adapters still pending at the deadline are
    /// reported as timed out and their partial work is discarded.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Queries all adapters concurrently.
    ///
    /// Returns `NoResults` only when no adapter produced a listing.
    pub async fn aggregate(&self, query: &str) -> Result<AggregatedResult, AggregateError> {
        info!("Aggregating '{}' across {} sources", query, self.adapters.len());

        let deadline = self.deadline.map(|d| Instant::now() + d);
        let outcomes = join_all(self.adapters.iter().map(|adapter| async move {
            let fetch = adapter.fetch(query);
            match deadline {
                Some(at) => tokio::time::timeout_at(at, fetch)
                    .await
                    .unwrap_or(SourceOutcome::Failed(SourceError::Timeout)),
                None => fetch.await,
            }
        }))
        .await;

        let mut combined = Vec::new();
        let mut reports = Vec::with_capacity(outcomes.len());

        for (adapter, outcome) in self.adapters.iter().zip(outcomes) {
            let report = match outcome {
                SourceOutcome::Listings(listings) => {
                    let count = listings.len();
                    combined.extend(listings);
                    SourceReport {
                        source: adapter.name().to_string(),
                        listings: count,
                        error: None,
                    }
                }
                SourceOutcome::Failed(e) => {
                    warn!("{} produced no listings ({}): {}", adapter.name(), e.kind(), e);
                    SourceReport {
                        source: adapter.name().to_string(),
                        listings: 0,
                        error: Some(e),
                    }
                }
            };
            reports.push(report);
        }

        if combined.is_empty() {
            return Err(AggregateError::NoResults { query: query.to_string() });
        }

        let listings = dedup_and_sort(combined);
        info!("Aggregated {} listings for '{}'", listings.len(), query);

        Ok(AggregatedResult::new(query, listings, reports))
    }
}

/// Drops later duplicates of (title, reference price), then sorts ascending.
///
/// The sort is stable, so equal prices keep their adapter order.
fn dedup_and_sort(listings: Vec<Listing>) -> Vec<Listing> {
    let mut seen = HashSet::new();
    let mut unique: Vec<Listing> = listings
        .into_iter()
        .filter(|l| seen.insert((l.title.clone(), l.price_reference.to_bits())))
        .collect();

    unique.sort_by(|a, b| a.price_reference.total_cmp(&b.price_reference));
    unique
}
