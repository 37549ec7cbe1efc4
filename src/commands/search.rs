//! Search command implementation.

use crate::aggregator::Aggregator;
use crate::config::{Config, OutputFormat};
use crate::fetch::FetchPolicy;
use crate::filters::FilterChainBuilder;
use crate::format::Formatter;
use crate::models::Listing;
use crate::sources::{resolve_sources, MarketplaceAdapter, SourceAdapter};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Executes a price search across the configured sources.
pub struct SearchCommand {
    config: Config,
}

impl SearchCommand {
    /// Creates a new search command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Builds one adapter per configured source, sharing a single policy.
    pub fn build_adapters(&self) -> Result<Vec<Arc<dyn SourceAdapter>>> {
        let marketplaces = resolve_sources(&self.config.sources)?;
        let policy = Arc::new(FetchPolicy::from_config(&self.config));
        let rates = Arc::new(self.config.rates.clone());

        marketplaces
            .into_iter()
            .map(|marketplace| -> Result<Arc<dyn SourceAdapter>> {
                let adapter = MarketplaceAdapter::new(marketplace, policy.clone(), rates.clone())
                    .with_context(|| format!("Failed to create adapter for {}", marketplace))?;
                Ok(Arc::new(adapter))
            })
            .collect()
    }

    /// Executes the search and returns formatted output.
    pub async fn execute(&self, query: &str) -> Result<String> {
        let adapters = self.build_adapters()?;
        self.execute_with_adapters(adapters, query).await
    }

    /// Executes the search with provided adapters (for testing).
    pub async fn execute_with_adapters(
        &self,
        adapters: Vec<Arc<dyn SourceAdapter>>,
        query: &str,
    ) -> Result<String> {
        let query = query.trim();
        if query.is_empty() {
            anyhow::bail!("Search query must not be empty");
        }

        info!("Searching {} sources for: {}", adapters.len(), query);

        let mut aggregator = Aggregator::new(adapters);
        if self.config.deadline_secs > 0 {
            aggregator = aggregator.with_deadline(Duration::from_secs(self.config.deadline_secs));
        }

        let result = aggregator.aggregate(query).await?;

        let filters = FilterChainBuilder::new()
            .price_range(self.config.min_price, self.config.max_price)
            .exclude_keywords(self.config.exclude_keywords.clone())
            .build();

        if !filters.is_empty() {
            debug!("Active filters: {}", filters.descriptions().join(", "));
        }

        let mut shown: Vec<&Listing> = filters.apply(&result);
        debug!(
            "{} of {} listings for '{}' passed filters",
            shown.len(),
            result.len(),
            result.query()
        );

        if self.config.max_results > 0 {
            shown.truncate(self.config.max_results);
        }

        let formatter = Formatter::new(self.config.format);

        if shown.is_empty() && !matches!(self.config.format, OutputFormat::Json | OutputFormat::Csv)
        {
            return Ok(format!(
                "No listings match the filters ({} found before filtering).",
                result.len()
            ));
        }

        let mut output = formatter.format_listings(&shown);

        if self.config.format == OutputFormat::Table {
            let failures = formatter.format_reports(result.reports());
            if !failures.is_empty() {
                output.push_str("\n\n");
                output.push_str(&failures);
            }
        }

        Ok(output)
    }
}
