//! Keyword-based title filtering.

use super::Filter;
use crate::models::Listing;

/// Drops listings whose title contains any excluded word.
pub struct KeywordFilter {
    /// Keywords that must NOT appear in the title (lowercase).
    excluded: Vec<String>,
}

impl KeywordFilter {
    /// Creates a filter with excluded keywords, matched case-insensitively.
    pub fn excluded(keywords: Vec<String>) -> Self {
        Self {
            excluded: keywords.into_iter().map(|k| k.trim().to_lowercase()).collect(),
        }
    }
}

impl Filter for KeywordFilter {
    fn matches(&self, listing: &Listing) -> bool {
        let title = listing.title.to_lowercase();
        !self.excluded.iter().any(|keyword| title.contains(keyword))
    }

    fn description(&self) -> String {
        if self.excluded.is_empty() {
            "Keywords: any".to_string()
        } else {
            format!("Must not contain: {}", self.excluded.join(", "))
        }
    }
}
