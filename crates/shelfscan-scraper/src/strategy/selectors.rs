//! CSS-selector extraction for grocery search result pages.

use std::time::Duration;

use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use shelfscan_core::normalize::parse_price;
use shelfscan_core::{Listing, ListingOrigin, Source};

use super::ExtractionStrategy;
use crate::fetch::{FetchedPage, FieldSelector, PageItem, PageRequest};

const NAME: usize = 0;
const PRICE: usize = 1;
const SIZE: usize = 2;
const IMAGE: usize = 3;
const LINK: usize = 4;
const LOYALTY: usize = 5;

/// Where a source's result page keeps each product field.
///
/// Each field lists its selector candidates in priority order.
#[derive(Debug, Clone, Copy)]
pub struct SelectorRules {
    pub search_path: &'static str,
    pub item: &'static str,
    pub name: &'static [&'static str],
    pub price: &'static [&'static str],
    pub size: &'static [&'static str],
    pub image: &'static [&'static str],
    pub link: &'static [&'static str],
    pub loyalty: &'static [&'static str],
}

const TESCO: SelectorRules = SelectorRules {
    search_path: "/groceries/en-GB/search?query=",
    item: "li.product-list--list-item",
    name: &["a.product-tile--title"],
    price: &["p.price-per-sellable-unit span.value"],
    size: &["p.price-per-quantity-weight span.value"],
    image: &["img.product-image"],
    link: &["a.product-tile--title"],
    loyalty: &["span.offer-text"],
};

const ASDA: SelectorRules = SelectorRules {
    search_path: "/search/",
    item: "div.co-product",
    name: &["a.co-product__anchor"],
    price: &["strong.co-product__price"],
    size: &["span.co-product__volume"],
    image: &["img.co-product__image"],
    link: &["a.co-product__anchor"],
    loyalty: &["span.co-product__rewards-price"],
};

const LIDL: SelectorRules = SelectorRules {
    search_path: "/search?query=",
    item: ".product-grid-item",
    name: &[".product-title", ".product-grid-box__title"],
    price: &[".price-tag", ".m-price__price"],
    size: &[".price-tag__base-price", ".m-price__base-price"],
    image: &["img"],
    link: &["a"],
    loyalty: &[".lidl-plus-price"],
};

const ICELAND: SelectorRules = SelectorRules {
    search_path: "/search?q=",
    item: "div.product-item, li.product, div.product-card",
    name: &["h3.product-title", "a.product-name", "div.product-title"],
    price: &["span.price", "p.product-price", "div.price"],
    size: &[".product-size", ".unit-price"],
    image: &["img.product-image", "img"],
    link: &["a.product-link", "a"],
    loyalty: &[".bonus-card-price"],
};

const GENERIC_ITEM: &str = ".product, .item, .deal, .offer";

const fn generic(search_path: &'static str) -> SelectorRules {
    SelectorRules {
        search_path,
        item: GENERIC_ITEM,
        name: &[".title", ".name", ".product-name", "h2", "h3"],
        price: &[".price", ".product-price"],
        size: &[".size", ".weight", ".unit-price"],
        image: &["img"],
        link: &["a"],
        loyalty: &[".member-price", ".offer-price"],
    }
}

/// Built-in selector rules for a grocery source.
///
/// Returns `None` for [`Source::HotDeals`], which is a deals forum handled by
/// its own strategy.
#[must_use]
pub fn rules_for(source: Source) -> Option<SelectorRules> {
    match source {
        Source::Tesco => Some(TESCO),
        Source::Asda => Some(ASDA),
        Source::Lidl => Some(LIDL),
        Source::Iceland => Some(ICELAND),
        Source::Costco | Source::BM | Source::WhiteRose => Some(generic("/search?q=")),
        Source::HotDeals => None,
    }
}

/// `base_url + search_path + query`, with the trimmed query percent-encoded.
#[must_use]
pub fn search_url(source: Source, search_path: &str, query: &str) -> String {
    format!(
        "{}{}{}",
        source.base_url(),
        search_path,
        utf8_percent_encode(query.trim(), NON_ALPHANUMERIC)
    )
}

/// Makes an image or page reference absolute against the source's base URL.
///
/// Inline `data:` images carry no useful reference and are dropped.
#[must_use]
pub fn resolve_ref(source: Source, reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() || reference.starts_with("data:") {
        return None;
    }
    if reference.starts_with("http://") || reference.starts_with("https://") {
        return Some(reference.to_string());
    }
    if let Some(rest) = reference.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    let base = source.base_url().trim_end_matches('/');
    match reference.strip_prefix('/') {
        Some(path) => Some(format!("{base}/{path}")),
        None => Some(format!("{base}/{reference}")),
    }
}

/// One-product-per-container extraction driven by [`SelectorRules`].
pub struct SelectorStrategy {
    source: Source,
    rules: SelectorRules,
}

impl SelectorStrategy {
    #[must_use]
    pub fn new(source: Source, rules: SelectorRules) -> Self {
        Self { source, rules }
    }

    fn listing_from_item(&self, item: &PageItem, observed_at: DateTime<Utc>) -> Option<Listing> {
        let name = item.first(NAME)?.trim();
        let price = parse_price(item.first(PRICE)?)?;
        let mut listing =
            Listing::new(self.source, name, price, ListingOrigin::Live, observed_at).ok()?;

        listing.size_text = item.first(SIZE).map(str::to_string);
        listing.image_ref = item.first(IMAGE).and_then(|r| resolve_ref(self.source, r));
        listing.page_ref = item.first(LINK).and_then(|r| resolve_ref(self.source, r));
        listing.loyalty_price = item
            .first(LOYALTY)
            .and_then(parse_price)
            .filter(|loyalty| *loyalty > rust_decimal::Decimal::ZERO && *loyalty < price);

        Some(listing)
    }
}

impl ExtractionStrategy for SelectorStrategy {
    fn source(&self) -> Source {
        self.source
    }

    fn page_request(&self, query: &str, navigation_timeout: Duration) -> PageRequest {
        PageRequest {
            url: search_url(self.source, self.rules.search_path, query),
            item_selector: Some(self.rules.item.to_string()),
            fields: vec![
                FieldSelector::text(self.rules.name),
                FieldSelector::text(self.rules.price),
                FieldSelector::text(self.rules.size),
                FieldSelector::attr(self.rules.image, "src"),
                FieldSelector::attr(self.rules.link, "href"),
                FieldSelector::text(self.rules.loyalty),
            ],
            navigation_timeout,
        }
    }

    fn extract(&self, page: &FetchedPage, observed_at: DateTime<Utc>) -> Vec<Listing> {
        page.items
            .iter()
            .filter_map(|item| self.listing_from_item(item, observed_at))
            .filter(Listing::is_admissible)
            .collect()
    }
}

#[cfg(test)]
#[path = "selectors_test.rs"]
mod tests;
