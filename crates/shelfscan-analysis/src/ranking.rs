//! Weighted ranking, sorting and recommendation.

use std::cmp::Ordering;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shelfscan_core::{Listing, SourceProfiles};

use crate::AnalysisError;

/// Number of recommendations returned.
pub const RECOMMENDATION_LIMIT: usize = 10;

const PRICE_WEIGHT: f64 = 0.4;
const CONFIDENCE_WEIGHT: f64 = 0.3;
const REPUTATION_WEIGHT: f64 = 0.3;

/// `0.4 × 10/(price + 1) + 0.3 × match_confidence + 0.3 × reputation`.
#[must_use]
pub fn listing_score(listing: &Listing, profiles: &SourceProfiles) -> f64 {
    let price = listing.price().to_f64().unwrap_or(f64::MAX);
    PRICE_WEIGHT * (10.0 / (price + 1.0))
        + CONFIDENCE_WEIGHT * listing.match_confidence()
        + REPUTATION_WEIGHT * profiles.reputation(listing.source)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    PriceAsc,
    PriceDesc,
    PricePerUnitAsc,
    PricePerUnitDesc,
    NameAsc,
    NameDesc,
    SourceAsc,
    SourceDesc,
    #[default]
    Score,
}

impl SortOrder {
    pub const ALL: [SortOrder; 9] = [
        SortOrder::PriceAsc,
        SortOrder::PriceDesc,
        SortOrder::PricePerUnitAsc,
        SortOrder::PricePerUnitDesc,
        SortOrder::NameAsc,
        SortOrder::NameDesc,
        SortOrder::SourceAsc,
        SortOrder::SourceDesc,
        SortOrder::Score,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::PriceAsc => "price_asc",
            SortOrder::PriceDesc => "price_desc",
            SortOrder::PricePerUnitAsc => "price_per_unit_asc",
            SortOrder::PricePerUnitDesc => "price_per_unit_desc",
            SortOrder::NameAsc => "name_asc",
            SortOrder::NameDesc => "name_desc",
            SortOrder::SourceAsc => "source_asc",
            SortOrder::SourceDesc => "source_desc",
            SortOrder::Score => "score",
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        SortOrder::ALL
            .into_iter()
            .find(|order| order.as_str() == wanted)
            .ok_or_else(|| AnalysisError::UnknownSortOrder(s.to_string()))
    }
}

/// Sorts `listings` in place. Every order is stable.
///
/// Listings without a price-per-unit go last under either price-per-unit order.
pub fn sort_listings(listings: &mut [Listing], order: SortOrder, profiles: &SourceProfiles) {
    match order {
        SortOrder::PriceAsc => listings.sort_by_key(Listing::price),
        SortOrder::PriceDesc => listings.sort_by(|a, b| b.price().cmp(&a.price())),
        SortOrder::PricePerUnitAsc => {
            listings.sort_by(|a, b| missing_last(a.price_per_unit(), b.price_per_unit(), false));
        }
        SortOrder::PricePerUnitDesc => {
            listings.sort_by(|a, b| missing_last(a.price_per_unit(), b.price_per_unit(), true));
        }
        SortOrder::NameAsc => listings.sort_by_cached_key(|l| l.raw_name.to_lowercase()),
        SortOrder::NameDesc => {
            listings.sort_by(|a, b| b.raw_name.to_lowercase().cmp(&a.raw_name.to_lowercase()));
        }
        SortOrder::SourceAsc => listings.sort_by_key(|l| l.source),
        SortOrder::SourceDesc => listings.sort_by(|a, b| b.source.cmp(&a.source)),
        SortOrder::Score => sort_by_score(listings, profiles),
    }
}

fn missing_last(a: Option<Decimal>, b: Option<Decimal>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn sort_by_score(listings: &mut [Listing], profiles: &SourceProfiles) {
    let mut scored: Vec<(f64, Listing)> = listings
        .iter()
        .map(|l| (listing_score(l, profiles), l.clone()))
        .collect();
    scored.sort_by(|(a, _), (b, _)| b.total_cmp(a));
    for (slot, (_, listing)) in listings.iter_mut().zip(scored) {
        *slot = listing;
    }
}

/// A ranked listing with the reasoning behind its score.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub listing: Listing,
    pub score: f64,
    pub rationale: String,
}

/// Parses a budget ceiling. Anything that is not a non-negative decimal
/// (optionally prefixed with `£`) is ignored.
#[must_use]
pub fn parse_budget(budget: &str) -> Option<Decimal> {
    let trimmed = budget.trim();
    let digits = trimmed.strip_prefix('£').unwrap_or(trimmed);
    Decimal::from_str(digits.trim())
        .ok()
        .filter(|ceiling| !ceiling.is_sign_negative())
}

/// Top [`RECOMMENDATION_LIMIT`] listings by score after the budget and
/// category filters. Equal scores keep input order.
#[must_use]
pub fn recommend(
    listings: &[Listing],
    budget: Option<&str>,
    category: Option<&str>,
    profiles: &SourceProfiles,
) -> Vec<Recommendation> {
    let ceiling = budget.and_then(|raw| {
        let parsed = parse_budget(raw);
        if parsed.is_none() {
            tracing::debug!(budget = raw, "ignoring unparseable budget");
        }
        parsed
    });

    let mut ranked: Vec<Recommendation> = listings
        .iter()
        .filter(|l| ceiling.is_none_or(|max| l.price() <= max))
        .filter(|l| {
            category.is_none_or(|wanted| {
                l.category
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(wanted.trim()))
            })
        })
        .map(|l| {
            let score = listing_score(l, profiles);
            Recommendation {
                rationale: rationale(l, profiles),
                listing: l.clone(),
                score,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(RECOMMENDATION_LIMIT);
    ranked
}

fn rationale(listing: &Listing, profiles: &SourceProfiles) -> String {
    format!(
        "£{:.2} at {} with {:.0}% match confidence and source reputation {:.2}",
        listing.price(),
        listing.source.display_name(),
        listing.match_confidence() * 100.0,
        profiles.reputation(listing.source)
    )
}

#[cfg(test)]
#[path = "ranking_test.rs"]
mod tests;
