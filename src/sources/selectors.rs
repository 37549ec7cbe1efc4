//! CSS selectors for marketplace search pages.
//!
//! Every marketplace lists its item containers primary-first; the extractor
//! falls through to the next container selector only when the previous one
//! matched nothing. Update this file when a marketplace changes its HTML.
//!
//! **Update process**: When parsing fails, capture HTML sample,
//! update selectors, and add test fixture.

use scraper::Selector;
use std::sync::LazyLock;

fn compile(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e}"))
}

/// Amazon search results (all regional domains share markup).
pub mod amazon {
    use super::*;

    /// Product card container - main search result item.
    pub static RESULT: LazyLock<Selector> =
        LazyLock::new(|| compile("div[data-component-type='s-search-result']"));

    /// Older grid layout card.
    pub static RESULT_GRID: LazyLock<Selector> =
        LazyLock::new(|| compile("div.s-result-item[data-asin]:not([data-asin=''])"));

    /// Product title text.
    pub static TITLE: LazyLock<Selector> = LazyLock::new(|| compile("span.a-text-normal"));

    /// Heading fallback when the title span is missing.
    pub static TITLE_HEADING: LazyLock<Selector> = LazyLock::new(|| compile("h2"));

    /// Full current price (skips strikethrough list prices).
    pub static PRICE_CURRENT: LazyLock<Selector> =
        LazyLock::new(|| compile(".a-price:not([data-a-strike]) .a-offscreen"));

    /// Whole price (dollars/euros part).
    pub static PRICE_WHOLE: LazyLock<Selector> = LazyLock::new(|| compile("span.a-price-whole"));

    /// Title link for URL extraction.
    pub static TITLE_LINK: LazyLock<Selector> =
        LazyLock::new(|| compile("h2 a, a.a-link-normal.s-underline-text"));

    /// CAPTCHA form / robot check.
    pub static CAPTCHA: LazyLock<Selector> =
        LazyLock::new(|| compile("form[action*='validateCaptcha'], img[src*='captcha']"));
}

/// eBay search results.
pub mod ebay {
    use super::*;

    pub static ITEM_INFO: LazyLock<Selector> = LazyLock::new(|| compile("div.s-item__info"));

    pub static RIVER: LazyLock<Selector> = LazyLock::new(|| compile("div.srp-river-results"));

    pub static TITLE: LazyLock<Selector> = LazyLock::new(|| compile("div.s-item__title"));

    pub static TITLE_H3: LazyLock<Selector> = LazyLock::new(|| compile("h3.s-item__title"));

    pub static PRICE: LazyLock<Selector> = LazyLock::new(|| compile("span.s-item__price"));

    pub static PRICE_POSITIVE: LazyLock<Selector> = LazyLock::new(|| compile("span.POSITIVE"));

    pub static LINK: LazyLock<Selector> = LazyLock::new(|| compile("a.s-item__link"));
}

/// Zoodmall (zoodmall.uz) search results.
pub mod zoodmall {
    use super::*;

    pub static ITEM: LazyLock<Selector> = LazyLock::new(|| compile("div.product-item-list"));

    pub static CARD: LazyLock<Selector> = LazyLock::new(|| compile("a.product-mini"));

    pub static TITLE: LazyLock<Selector> = LazyLock::new(|| compile("div.product-mini__title"));

    pub static PRICE: LazyLock<Selector> =
        LazyLock::new(|| compile("div.product-mini__totalLocalPrice"));

    pub static PRICE_ANY: LazyLock<Selector> =
        LazyLock::new(|| compile("[class*='product-mini__'][class*='Price']"));

    pub static LINK: LazyLock<Selector> = LazyLock::new(|| compile("a.product-mini"));
}

/// Uzum (uzum.uz) search results.
pub mod uzum {
    use super::*;

    /// Cards inside the results grid.
    pub static CARD: LazyLock<Selector> =
        LazyLock::new(|| compile("div.products-list a.product-card"));

    /// Any product card on the page.
    pub static CARD_ANY: LazyLock<Selector> = LazyLock::new(|| compile("a.product-card"));

    pub static TITLE: LazyLock<Selector> = LazyLock::new(|| compile(".product-card__title"));

    pub static PRICE: LazyLock<Selector> = LazyLock::new(|| compile("span.product-card-price"));

    pub static PRICE_ANY: LazyLock<Selector> =
        LazyLock::new(|| compile("[class*='product-card-price']"));
}

/// Asaxiy (asaxiy.uz) search results.
pub mod asaxiy {
    use super::*;

    pub static ITEM: LazyLock<Selector> = LazyLock::new(|| {
        compile("div.product__item.d-flex.flex-column.justify-content-between")
    });

    pub static ITEM_ANY: LazyLock<Selector> = LazyLock::new(|| compile("div.product__item"));

    pub static TITLE: LazyLock<Selector> =
        LazyLock::new(|| compile("span.product__item__info-title"));

    pub static TITLE_ANY: LazyLock<Selector> =
        LazyLock::new(|| compile(".product__item__info-title, h5"));

    pub static PRICE: LazyLock<Selector> = LazyLock::new(|| compile("span.product__item-price"));

    pub static LINK: LazyLock<Selector> = LazyLock::new(|| compile("a[href]"));
}
