//! Rule-driven extraction of raw listings from a search page.

use crate::error::{ItemError, SourceError};
use crate::models::RawListing;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

/// One way of reading a field out of an item container.
#[derive(Debug, Clone, Copy)]
pub enum FieldRule {
    /// Text content of the first descendant matching the selector
    Text(&'static Selector),
    /// Attribute of the first matching descendant that has it
    Attr(&'static Selector, &'static str),
    /// Attribute of the container element itself
    OwnAttr(&'static str),
}

impl FieldRule {
    fn apply(&self, item: ElementRef) -> Option<String> {
        let value = match self {
            FieldRule::Text(selector) => {
                item.select(selector).next().map(|e| e.text().collect::<String>())
            }
            FieldRule::Attr(selector, attr) => {
                item.select(selector).find_map(|e| e.value().attr(attr)).map(String::from)
            }
            FieldRule::OwnAttr(attr) => item.value().attr(attr).map(String::from),
        }?;

        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

/// Ordered extraction rules for one marketplace.
///
/// Each list is tried front to back and the first rule producing a
/// non-empty value wins.
#[derive(Debug, Clone, Default)]
pub struct ExtractRules {
    /// Item container selectors, primary first
    pub containers: Vec<&'static Selector>,
    pub title: Vec<FieldRule>,
    pub price: Vec<FieldRule>,
    pub link: Vec<FieldRule>,
    /// Any match means the page is a block/CAPTCHA page
    pub blocked: Vec<&'static Selector>,
    /// Titles containing any of these are layout placeholders, not items
    pub placeholder_titles: Vec<&'static str>,
}

/// Items read from one page.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Number of item containers the winning selector matched
    pub containers: usize,
    /// Items that yielded a title and price text
    pub items: Vec<RawListing>,
}

/// Extracts raw listings from `html`.
///
/// Relative links are resolved against `base_url`. A container that is
/// missing a field is skipped without affecting its siblings.
pub fn extract_page(html: &str, rules: &ExtractRules, base_url: &str) -> Result<Page, SourceError> {
    let document = Html::parse_document(html);

    if rules.blocked.iter().any(|selector| document.select(selector).next().is_some()) {
        return Err(SourceError::RateLimited);
    }

    let Some((rank, containers)) = rules
        .containers
        .iter()
        .map(|selector| document.select(selector).collect::<Vec<_>>())
        .enumerate()
        .find(|(_, found)| !found.is_empty())
    else {
        return Err(SourceError::Parse("no item containers matched".to_string()));
    };

    if rank > 0 {
        debug!("Primary container selector missed, fallback #{} matched", rank);
    }

    let mut page = Page { containers: containers.len(), items: Vec::new() };

    for container in containers {
        match extract_item(container, rules, base_url) {
            Ok(item) => page.items.push(item),
            Err(e) => trace!("Skipping item container: {}", e),
        }
    }

    debug!("Extracted {} of {} item containers", page.items.len(), page.containers);
    Ok(page)
}

fn extract_item(
    item: ElementRef,
    rules: &ExtractRules,
    base_url: &str,
) -> Result<RawListing, ItemError> {
    let title = first_match(&rules.title, item).ok_or(ItemError::MissingTitle)?;

    if rules.placeholder_titles.iter().any(|p| title.contains(p)) {
        return Err(ItemError::Placeholder);
    }

    let raw_price = first_match(&rules.price, item).ok_or(ItemError::MissingPrice)?;

    let mut listing = RawListing::new(title, raw_price);
    if let Some(href) = first_match(&rules.link, item) {
        listing = listing.with_link(resolve_link(base_url, &href));
    }

    Ok(listing)
}

fn first_match(rules: &[FieldRule], item: ElementRef) -> Option<String> {
    rules.iter().find_map(|rule| rule.apply(item))
}

/// Turns an href into an absolute URL.
pub fn resolve_link(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if let Some(rest) = href.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), href.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::LazyLock;

    static ITEM: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.item").unwrap());
    static CARD: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li.card").unwrap());
    static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".title").unwrap());
    static NAME: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h3").unwrap());
    static PRICE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".price").unwrap());
    static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());
    static CAPTCHA: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("form.captcha").unwrap());

    fn rules() -> ExtractRules {
        ExtractRules {
            containers: vec![&*ITEM, &*CARD],
            title: vec![FieldRule::Text(&*TITLE), FieldRule::Text(&*NAME)],
            price: vec![FieldRule::Text(&*PRICE)],
            link: vec![FieldRule::Attr(&*LINK, "href")],
            blocked: vec![&*CAPTCHA],
            placeholder_titles: vec!["Shop on"],
        }
    }

    #[test]
    fn test_extract_primary_containers() {
        let html = r#"
            <div class="item"><span class="title">Mouse</span><span class="price">$10</span>
                <a href="/p/1">x</a></div>
            <div class="item"><span class="title">Keyboard</span><span class="price">$20</span></div>
        "#;

        let page = extract_page(html, &rules(), "https://shop.test").unwrap();
        assert_eq!(page.containers, 2);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].title, "Mouse");
        assert_eq!(page.items[0].raw_price, "$10");
        assert_eq!(page.items[0].link.as_deref(), Some("https://shop.test/p/1"));
        assert!(page.items[1].link.is_none());
    }

    #[test]
    fn test_extract_falls_back_to_next_container_selector() {
        let html = r#"<ul><li class="card"><h3>Mouse</h3><b class="price">5</b></li></ul>"#;

        let page = extract_page(html, &rules(), "https://shop.test").unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title, "Mouse");
    }

    #[test]
    fn test_extract_skips_broken_items() {
        let html = r#"
            <div class="item"><span class="price">$10</span></div>
            <div class="item"><span class="title">No price</span></div>
            <div class="item"><span class="title">Shop on Test</span><span class="price">$1</span></div>
            <div class="item"><span class="title">  </span><h3>Good</h3><span class="price">$3</span></div>
        "#;

        let page = extract_page(html, &rules(), "https://shop.test").unwrap();
        assert_eq!(page.containers, 4);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title, "Good");
    }

    #[test]
    fn test_extract_no_containers_is_parse_error() {
        let result = extract_page("<html><body></body></html>", &rules(), "https://shop.test");
        assert!(matches!(result, Err(SourceError::Parse(_))));
    }

    #[test]
    fn test_extract_blocked_page() {
        let html = r#"<form class="captcha"></form><div class="item"></div>"#;
        let result = extract_page(html, &rules(), "https://shop.test");
        assert_eq!(result.unwrap_err(), SourceError::RateLimited);
    }

    #[test]
    fn test_own_attr_rule() {
        let rules = ExtractRules {
            containers: vec![&*LINK],
            title: vec![FieldRule::OwnAttr("title")],
            price: vec![FieldRule::Text(&*PRICE)],
            link: vec![FieldRule::OwnAttr("href")],
            ..ExtractRules::default()
        };
        let html = r#"<a href="/product/7" title="Phone"><span class="price">100</span></a>"#;

        let page = extract_page(html, &rules, "https://uzum.test/").unwrap();
        assert_eq!(page.items[0].title, "Phone");
        assert_eq!(page.items[0].link.as_deref(), Some("https://uzum.test/product/7"));
    }

    #[test]
    fn test_resolve_link() {
        assert_eq!(resolve_link("https://a.test", "https://b.test/x"), "https://b.test/x");
        assert_eq!(resolve_link("https://a.test", "//cdn.test/x"), "https://cdn.test/x");
        assert_eq!(resolve_link("https://a.test/", "/x"), "https://a.test/x");
        assert_eq!(resolve_link("https://a.test", "x"), "https://a.test/x");
    }
}
