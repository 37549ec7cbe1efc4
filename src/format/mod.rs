//! Output formatting for listings (table, JSON, markdown, CSV).

use crate::config::OutputFormat;
use crate::models::{Listing, PriceSummary, SourceReport};
use crate::pricing::REFERENCE_CURRENCY;

const CSV_HEADER: &str = "Title,Price,Currency,Source,Price_USD,Link";

/// Formats listings for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats listings, already in display order.
    pub fn format_listings(&self, listings: &[&Listing]) -> String {
        if listings.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => CSV_HEADER.to_string(),
                _ => "No listings found.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => self.json_listings(listings),
            OutputFormat::Table => self.table_listings(listings),
            OutputFormat::Markdown => self.markdown_listings(listings),
            OutputFormat::Csv => self.csv_listings(listings),
        }
    }

    /// One line per source that produced nothing; empty if all succeeded.
    pub fn format_reports(&self, reports: &[SourceReport]) -> String {
        reports
            .iter()
            .filter_map(|r| r.error.as_ref().map(|e| format!("{}: no listings ({})", r.source, e)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    // JSON formatting

    fn json_listings(&self, listings: &[&Listing]) -> String {
        serde_json::to_string_pretty(listings).unwrap_or_else(|_| "[]".to_string())
    }

    // Table formatting

    fn table_listings(&self, listings: &[&Listing]) -> String {
        let price_width = 14;
        let ref_width = 10;
        let source_width = 12;
        let title_width = 60;

        let mut lines = Vec::new();

        lines.push(format!(
            "{:>price_width$}  {:>ref_width$}  {:<source_width$}  {}",
            "Price", REFERENCE_CURRENCY, "Source", "Title"
        ));
        lines.push(format!(
            "{:-<price_width$}  {:-<ref_width$}  {:-<source_width$}  {:-<title_width$}",
            "", "", "", ""
        ));

        for listing in listings {
            lines.push(format!(
                "{:>price_width$}  {:>ref_width$.2}  {:<source_width$}  {}",
                format!("{:.2} {}", listing.price, listing.currency),
                listing.price_reference,
                listing.source,
                truncate(&listing.title, title_width)
            ));
        }

        lines.push(String::new());
        lines.push(format!("Total: {} listings", listings.len()));
        if let Some(summary) = PriceSummary::of(listings.iter().copied()) {
            lines.push(format!(
                "{}: mean {:.2}, min {:.2}, max {:.2}",
                REFERENCE_CURRENCY, summary.mean, summary.min, summary.max
            ));
        }

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_listings(&self, listings: &[&Listing]) -> String {
        let mut lines = Vec::new();

        lines.push(format!("| Title | Price | Currency | Source | Price_{} |", REFERENCE_CURRENCY));
        lines.push("|-------|-------|----------|--------|-----------|".to_string());

        for listing in listings {
            let title = truncate(&listing.title, 50).replace('|', "\\|");
            let title = match &listing.link {
                Some(link) => format!("[{}]({})", title, link),
                None => title,
            };

            lines.push(format!(
                "| {} | {:.2} | {} | {} | {:.2} |",
                title, listing.price, listing.currency, listing.source, listing.price_reference
            ));
        }

        lines.push(String::new());
        lines.push(format!("*{} listings found*", listings.len()));

        lines.join("\n")
    }

    // CSV formatting

    fn csv_listings(&self, listings: &[&Listing]) -> String {
        let mut lines = Vec::new();
        lines.push(CSV_HEADER.to_string());

        for listing in listings {
            lines.push(format!(
                "{},{},{},{},{},{}",
                Self::csv_escape(&listing.title),
                listing.price,
                listing.currency,
                Self::csv_escape(&listing.source),
                listing.price_reference,
                listing.link.as_deref().map(Self::csv_escape).unwrap_or_default()
            ));
        }

        lines.join("\n")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

/// Shortens `s` to at most `max` characters, ending in "...".
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::models::RawListing;
    use crate::pricing::RateTable;

    fn make_listing(title: &str, raw: &str, source: &str, currency: &str) -> Listing {
        Listing::normalize(RawListing::new(title, raw), source, currency, &RateTable::default())
            .unwrap()
    }

    fn sample() -> Vec<Listing> {
        vec![
            make_listing("Wireless Mouse", "$10.00", "eBay", "USD"),
            Listing::normalize(
                RawListing::new("Funkmaus, schwarz", "20,00 €")
                    .with_link("https://amazon.de/dp/B1"),
                "Amazon DE",
                "EUR",
                &RateTable::default(),
            )
            .unwrap(),
        ]
    }

    fn refs(listings: &[Listing]) -> Vec<&Listing> {
        listings.iter().collect()
    }

    #[test]
    fn test_json_listings() {
        let listings = sample();
        let output = Formatter::new(OutputFormat::Json).format_listings(&refs(&listings));

        assert!(output.starts_with('['));
        assert!(output.ends_with(']'));
        assert!(output.contains("\"title\": \"Wireless Mouse\""));
        assert!(output.contains("\"price_reference\""));
        assert!(output.contains("https://amazon.de/dp/B1"));
    }

    #[test]
    fn test_empty_outputs() {
        assert_eq!(Formatter::new(OutputFormat::Json).format_listings(&[]), "[]");
        assert_eq!(Formatter::new(OutputFormat::Table).format_listings(&[]), "No listings found.");
        assert_eq!(
            Formatter::new(OutputFormat::Markdown).format_listings(&[]),
            "No listings found."
        );
        assert_eq!(Formatter::new(OutputFormat::Csv).format_listings(&[]), CSV_HEADER);
    }

    #[test]
    fn test_table_listings() {
        let listings = sample();
        let output = Formatter::new(OutputFormat::Table).format_listings(&refs(&listings));

        assert!(output.contains("Price"));
        assert!(output.contains("Source"));
        assert!(output.contains("----------"));
        assert!(output.contains("10.00 USD"));
        assert!(output.contains("20.00 EUR"));
        assert!(output.contains("22.29"));
        assert!(output.contains("Amazon DE"));
        assert!(output.contains("Total: 2 listings"));
        assert!(output.contains("USD: mean 16.15, min 10.00, max 22.29"));
    }

    #[test]
    fn test_table_truncates_multibyte_titles() {
        let title = "Смартфон ".repeat(20);
        let listings = vec![make_listing(&title, "1 000 000", "Uzum", "UZS")];
        let output = Formatter::new(OutputFormat::Table).format_listings(&refs(&listings));

        assert!(output.contains("..."));
        assert!(output.contains("76.92"));
    }

    #[test]
    fn test_markdown_listings() {
        let listings = sample();
        let output = Formatter::new(OutputFormat::Markdown).format_listings(&refs(&listings));

        assert!(output.contains("| Title | Price | Currency | Source | Price_USD |"));
        assert!(output.contains("| Wireless Mouse | 10.00 | USD | eBay | 10.00 |"));
        assert!(output.contains("[Funkmaus, schwarz](https://amazon.de/dp/B1)"));
        assert!(output.contains("*2 listings found*"));
    }

    #[test]
    fn test_csv_listings() {
        let listings = sample();
        let output = Formatter::new(OutputFormat::Csv).format_listings(&refs(&listings));

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Title,Price,Currency,Source,Price_USD,Link");
        assert_eq!(lines[1], "Wireless Mouse,10,USD,eBay,10,");
        assert!(lines[2].starts_with("\"Funkmaus, schwarz\",20,EUR,Amazon DE,"));
        assert!(lines[2].ends_with(",https://amazon.de/dp/B1"));
    }

    #[test]
    fn test_csv_escape() {
        assert_eq!(Formatter::csv_escape("simple"), "simple");
        assert_eq!(Formatter::csv_escape("with,comma"), "\"with,comma\"");
        assert_eq!(Formatter::csv_escape("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(Formatter::csv_escape("with\nnewline"), "\"with\nnewline\"");
    }

    #[test]
    fn test_format_reports() {
        let reports = vec![
            SourceReport { source: "eBay".to_string(), listings: 3, error: None },
            SourceReport {
                source: "Amazon DE".to_string(),
                listings: 0,
                error: Some(SourceError::RateLimited),
            },
        ];

        let output = Formatter::new(OutputFormat::Table).format_reports(&reports);
        assert_eq!(output, "Amazon DE: no listings (rate limited or blocked by the marketplace)");
        assert!(Formatter::new(OutputFormat::Table).format_reports(&reports[..1]).is_empty());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
        assert_eq!(truncate("this is too long", 10), "this is...");
    }
}
