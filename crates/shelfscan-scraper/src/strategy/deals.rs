//! HotDeals forum extraction.
//!
//! Deal pages have no per-product container, so titles and prices are
//! collected document-wide and paired by position.

use std::time::Duration;

use chrono::{DateTime, Utc};
use shelfscan_core::normalize::parse_price;
use shelfscan_core::{Listing, ListingOrigin, Source};

use super::selectors::search_url;
use super::ExtractionStrategy;
use crate::fetch::{FetchedPage, FieldSelector, PageRequest};

const SEARCH_PATH: &str = "/search?q=";
const TITLES: &[&str] = &[".deal-title", ".thread-title", ".post-title", "h3 a"];
const PRICES: &[&str] = &[".price", ".deal-price", ".amount", ".cost"];
const MAX_DEALS: usize = 10;
const DEAL_CONFIDENCE: f64 = 0.85;

pub struct DealsStrategy;

impl ExtractionStrategy for DealsStrategy {
    fn source(&self) -> Source {
        Source::HotDeals
    }

    fn page_request(&self, query: &str, navigation_timeout: Duration) -> PageRequest {
        PageRequest {
            url: search_url(Source::HotDeals, SEARCH_PATH, query),
            item_selector: None,
            fields: vec![FieldSelector::text(TITLES), FieldSelector::text(PRICES)],
            navigation_timeout,
        }
    }

    fn extract(&self, page: &FetchedPage, observed_at: DateTime<Utc>) -> Vec<Listing> {
        let mut listings = Vec::new();
        for item in &page.items {
            for (title, price) in item.all(0).iter().zip(item.all(1)).take(MAX_DEALS) {
                let Some(price) = parse_price(price) else {
                    continue;
                };
                let Ok(mut listing) = Listing::new(
                    Source::HotDeals,
                    title.trim(),
                    price,
                    ListingOrigin::Live,
                    observed_at,
                ) else {
                    continue;
                };
                listing.set_match_confidence(DEAL_CONFIDENCE);
                if listing.is_admissible() {
                    listings.push(listing);
                }
            }
        }
        listings
    }
}
