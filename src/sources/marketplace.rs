//! Marketplace catalogue: ids, labels, currencies, and search URLs.

use super::extract::{ExtractRules, FieldRule};
use super::selectors::{amazon, asaxiy, ebay, uzum, zoodmall};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Amazon regional storefronts whose currencies have reference rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AmazonRegion {
    #[default]
    Us,
    Uk,
    De,
    Fr,
    Es,
    It,
    Nl,
}

impl AmazonRegion {
    /// Returns the Amazon domain for this region.
    pub fn domain(&self) -> &'static str {
        match self {
            AmazonRegion::Us => "amazon.com",
            AmazonRegion::Uk => "amazon.co.uk",
            AmazonRegion::De => "amazon.de",
            AmazonRegion::Fr => "amazon.fr",
            AmazonRegion::Es => "amazon.es",
            AmazonRegion::It => "amazon.it",
            AmazonRegion::Nl => "amazon.nl",
        }
    }

    /// Top-level domain part after `amazon.`, e.g. `co.uk`.
    pub fn tld(&self) -> &'static str {
        self.domain().trim_start_matches("amazon.")
    }

    /// Returns the currency code for this region.
    pub fn currency(&self) -> &'static str {
        match self {
            AmazonRegion::Us => "USD",
            AmazonRegion::Uk => "GBP",
            AmazonRegion::De
            | AmazonRegion::Fr
            | AmazonRegion::Es
            | AmazonRegion::It
            | AmazonRegion::Nl => "EUR",
        }
    }

    /// Returns the Accept-Language header value for this region.
    pub fn accept_language(&self) -> &'static str {
        match self {
            AmazonRegion::Us => "en-US,en;q=0.9",
            AmazonRegion::Uk => "en-GB,en;q=0.9",
            AmazonRegion::De => "de-DE,de;q=0.9,en;q=0.8",
            AmazonRegion::Fr => "fr-FR,fr;q=0.9,en;q=0.8",
            AmazonRegion::Es => "es-ES,es;q=0.9,en;q=0.8",
            AmazonRegion::It => "it-IT,it;q=0.9,en;q=0.8",
            AmazonRegion::Nl => "nl-NL,nl;q=0.9,en;q=0.8",
        }
    }

    /// Returns all supported regions.
    pub fn all() -> &'static [AmazonRegion] {
        &[
            AmazonRegion::Us,
            AmazonRegion::Uk,
            AmazonRegion::De,
            AmazonRegion::Fr,
            AmazonRegion::Es,
            AmazonRegion::It,
            AmazonRegion::Nl,
        ]
    }
}

/// A marketplace the engine knows how to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marketplace {
    Amazon(AmazonRegion),
    Ebay,
    Zoodmall,
    Uzum,
    Asaxiy,
}

impl Marketplace {
    /// International group, in dedup tie-break order.
    pub fn international() -> Vec<Marketplace> {
        vec![
            Marketplace::Ebay,
            Marketplace::Amazon(AmazonRegion::Us),
            Marketplace::Amazon(AmazonRegion::Uk),
            Marketplace::Amazon(AmazonRegion::De),
        ]
    }

    /// Uzbek marketplaces, priced in UZS.
    pub fn local() -> Vec<Marketplace> {
        vec![Marketplace::Zoodmall, Marketplace::Uzum, Marketplace::Asaxiy]
    }

    /// Every known marketplace.
    pub fn all() -> Vec<Marketplace> {
        let mut all = vec![Marketplace::Ebay];
        all.extend(AmazonRegion::all().iter().copied().map(Marketplace::Amazon));
        all.extend(Self::local());
        all
    }

    /// Stable identifier, e.g. `amazon-co-uk`.
    pub fn id(&self) -> String {
        match self {
            Marketplace::Amazon(region) => format!("amazon-{}", region.tld().replace('.', "-")),
            Marketplace::Ebay => "ebay".to_string(),
            Marketplace::Zoodmall => "zoodmall".to_string(),
            Marketplace::Uzum => "uzum".to_string(),
            Marketplace::Asaxiy => "asaxiy".to_string(),
        }
    }

    /// Source label stamped on every listing, e.g. `Amazon CO.UK`.
    pub fn label(&self) -> String {
        match self {
            Marketplace::Amazon(region) => format!("Amazon {}", region.tld().to_uppercase()),
            Marketplace::Ebay => "eBay".to_string(),
            Marketplace::Zoodmall => "Zoodmall".to_string(),
            Marketplace::Uzum => "Uzum".to_string(),
            Marketplace::Asaxiy => "Asaxiy".to_string(),
        }
    }

    /// Currency listings are priced in unless the price text says otherwise.
    pub fn currency(&self) -> &'static str {
        match self {
            Marketplace::Amazon(region) => region.currency(),
            Marketplace::Ebay => "USD",
            Marketplace::Zoodmall | Marketplace::Uzum | Marketplace::Asaxiy => "UZS",
        }
    }

    /// Default base URL (no trailing slash).
    pub fn base_url(&self) -> String {
        match self {
            Marketplace::Amazon(region) => format!("https://www.{}", region.domain()),
            Marketplace::Ebay => "https://www.ebay.com".to_string(),
            Marketplace::Zoodmall => "https://www.zoodmall.uz".to_string(),
            Marketplace::Uzum => "https://uzum.uz".to_string(),
            Marketplace::Asaxiy => "https://asaxiy.uz".to_string(),
        }
    }

    pub fn accept_language(&self) -> &'static str {
        match self {
            Marketplace::Amazon(region) => region.accept_language(),
            Marketplace::Ebay => "en-US,en;q=0.9",
            Marketplace::Zoodmall | Marketplace::Uzum | Marketplace::Asaxiy => {
                "uz-UZ,uz;q=0.9,ru;q=0.8,en;q=0.7"
            }
        }
    }

    /// Candidate search paths for `query`, tried in order.
    pub fn search_paths(&self, query: &str) -> Vec<String> {
        let q = self.encode_query(query);
        match self {
            Marketplace::Amazon(_) => vec![format!("/s?k={}&ref=nb_sb_noss", q)],
            Marketplace::Ebay => {
                vec![format!("/sch/i.html?_nkw={}", q), format!("/sch/i.html?_nkw={}&_sacat=0", q)]
            }
            Marketplace::Zoodmall => vec![format!("/search/?q={}", q)],
            Marketplace::Uzum => vec![format!("/uz/search?query={}&needsCorrection=1", q)],
            Marketplace::Asaxiy => vec![format!("/product?key={}", q)],
        }
    }

    /// Percent-encodes `query`; whitespace becomes `+` where the site expects it.
    fn encode_query(&self, query: &str) -> String {
        let words: Vec<String> =
            query.split_whitespace().map(|w| urlencoding::encode(w).into_owned()).collect();

        match self {
            Marketplace::Amazon(_) | Marketplace::Ebay | Marketplace::Asaxiy => words.join("+"),
            Marketplace::Zoodmall | Marketplace::Uzum => words.join("%20"),
        }
    }

    /// Extraction rules for this marketplace's search page.
    pub fn rules(&self) -> ExtractRules {
        match self {
            Marketplace::Amazon(_) => ExtractRules {
                containers: vec![&*amazon::RESULT, &*amazon::RESULT_GRID],
                title: vec![
                    FieldRule::Text(&*amazon::TITLE),
                    FieldRule::Text(&*amazon::TITLE_HEADING),
                ],
                price: vec![
                    FieldRule::Text(&*amazon::PRICE_CURRENT),
                    FieldRule::Text(&*amazon::PRICE_WHOLE),
                ],
                link: vec![FieldRule::Attr(&*amazon::TITLE_LINK, "href")],
                blocked: vec![&*amazon::CAPTCHA],
                placeholder_titles: Vec::new(),
            },
            Marketplace::Ebay => ExtractRules {
                containers: vec![&*ebay::ITEM_INFO, &*ebay::RIVER],
                title: vec![FieldRule::Text(&*ebay::TITLE), FieldRule::Text(&*ebay::TITLE_H3)],
                price: vec![
                    FieldRule::Text(&*ebay::PRICE),
                    FieldRule::Text(&*ebay::PRICE_POSITIVE),
                ],
                link: vec![FieldRule::Attr(&*ebay::LINK, "href")],
                blocked: Vec::new(),
                placeholder_titles: vec!["Shop on eBay"],
            },
            Marketplace::Zoodmall => ExtractRules {
                containers: vec![&*zoodmall::ITEM, &*zoodmall::CARD],
                title: vec![FieldRule::Text(&*zoodmall::TITLE)],
                price: vec![
                    FieldRule::Text(&*zoodmall::PRICE),
                    FieldRule::Text(&*zoodmall::PRICE_ANY),
                ],
                link: vec![FieldRule::Attr(&*zoodmall::LINK, "href"), FieldRule::OwnAttr("href")],
                blocked: Vec::new(),
                placeholder_titles: Vec::new(),
            },
            Marketplace::Uzum => ExtractRules {
                containers: vec![&*uzum::CARD, &*uzum::CARD_ANY],
                title: vec![FieldRule::OwnAttr("title"), FieldRule::Text(&*uzum::TITLE)],
                price: vec![FieldRule::Text(&*uzum::PRICE), FieldRule::Text(&*uzum::PRICE_ANY)],
                link: vec![FieldRule::OwnAttr("href")],
                blocked: Vec::new(),
                placeholder_titles: Vec::new(),
            },
            Marketplace::Asaxiy => ExtractRules {
                containers: vec![&*asaxiy::ITEM, &*asaxiy::ITEM_ANY],
                title: vec![
                    FieldRule::Text(&*asaxiy::TITLE),
                    FieldRule::Text(&*asaxiy::TITLE_ANY),
                ],
                price: vec![FieldRule::Text(&*asaxiy::PRICE)],
                link: vec![FieldRule::Attr(&*asaxiy::LINK, "href")],
                blocked: Vec::new(),
                placeholder_titles: Vec::new(),
            },
        }
    }
}

impl fmt::Display for Marketplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Marketplace {
    type Err = MarketplaceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim().to_lowercase();
        Marketplace::all()
            .into_iter()
            .find(|m| m.id() == id)
            .ok_or_else(|| MarketplaceParseError(s.to_string()))
    }
}

impl Serialize for Marketplace {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.id())
    }
}

impl<'de> Deserialize<'de> for Marketplace {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error returned when parsing an invalid marketplace id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketplaceParseError(String);

impl fmt::Display for MarketplaceParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let valid: Vec<String> = Marketplace::all().iter().map(Marketplace::id).collect();
        write!(
            f,
            "Unknown source: '{}'. Valid sources: {}, or groups: international, local, all",
            self.0,
            valid.join(", ")
        )
    }
}

impl std::error::Error for MarketplaceParseError {}

/// Expands source ids and group names into marketplaces.
///
/// Order follows the input; a marketplace named twice is kept at its first
/// position. An empty input selects the international group.
pub fn resolve_sources(names: &[String]) -> Result<Vec<Marketplace>, MarketplaceParseError> {
    if names.iter().all(|n| n.trim().is_empty()) {
        return Ok(Marketplace::international());
    }

    let mut resolved: Vec<Marketplace> = Vec::new();
    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        let expanded = match name.to_lowercase().as_str() {
            "international" => Marketplace::international(),
            "local" => Marketplace::local(),
            "all" => Marketplace::all(),
            _ => vec![name.parse()?],
        };

        for marketplace in expanded {
            if !resolved.contains(&marketplace) {
                resolved.push(marketplace);
            }
        }
    }

    Ok(resolved)
}
