use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use shelfscan_core::{Listing, Source};

/// Category key for listings without a category.
pub const OTHER_CATEGORY: &str = "Other";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceStats {
    pub count: usize,
    pub average: Decimal,
    pub min: Decimal,
    pub max: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub count: usize,
    pub average: Decimal,
}

/// Mean price at 2 dp half-up. Zero for an empty set, which is
/// indistinguishable from a set of free items.
///
/// When the plain sum would overflow, each price is divided by the count
/// before adding.
#[must_use]
pub fn average_price<'a>(listings: impl IntoIterator<Item = &'a Listing>) -> Decimal {
    let prices: Vec<Decimal> = listings.into_iter().map(Listing::price).collect();
    if prices.is_empty() {
        return Decimal::ZERO;
    }
    let count = Decimal::from(prices.len());
    let mean = prices
        .iter()
        .try_fold(Decimal::ZERO, |sum, p| sum.checked_add(*p))
        .and_then(|sum| sum.checked_div(count))
        .unwrap_or_else(|| {
            prices
                .iter()
                .fold(Decimal::ZERO, |sum, p| sum.saturating_add(*p / count))
        });
    mean.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `max - min` of prices; zero for fewer than two listings.
#[must_use]
pub fn price_spread(listings: &[Listing]) -> Decimal {
    match price_bounds(listings.iter()) {
        Some((min, max)) => max - min,
        None => Decimal::ZERO,
    }
}

fn price_bounds<'a>(listings: impl Iterator<Item = &'a Listing>) -> Option<(Decimal, Decimal)> {
    listings.fold(None, |bounds, l| {
        let p = l.price();
        Some(match bounds {
            None => (p, p),
            Some((min, max)) => (min.min(p), max.max(p)),
        })
    })
}

/// Source of the cheapest listing; the first one in input order on ties.
#[must_use]
pub fn cheapest_source(listings: &[Listing]) -> Option<Source> {
    listings
        .iter()
        .fold(None::<&Listing>, |best, l| match best {
            Some(b) if b.price() <= l.price() => Some(b),
            _ => Some(l),
        })
        .map(|l| l.source)
}

/// Stats for each source present, keyed in declaration order.
#[must_use]
pub fn per_source_stats(listings: &[Listing]) -> BTreeMap<Source, SourceStats> {
    let mut groups: BTreeMap<Source, Vec<&Listing>> = BTreeMap::new();
    for listing in listings {
        groups.entry(listing.source).or_default().push(listing);
    }
    groups
        .into_iter()
        .filter_map(|(source, group)| {
            let (min, max) = price_bounds(group.iter().copied())?;
            Some((
                source,
                SourceStats {
                    count: group.len(),
                    average: average_price(group.iter().copied()),
                    min,
                    max,
                },
            ))
        })
        .collect()
}

/// Stats for each category present, keyed alphabetically. Uncategorized
/// listings are grouped under [`OTHER_CATEGORY`].
#[must_use]
pub fn per_category_stats(listings: &[Listing]) -> BTreeMap<String, CategoryStats> {
    let mut groups: BTreeMap<String, Vec<&Listing>> = BTreeMap::new();
    for listing in listings {
        let key = listing.category.as_deref().unwrap_or(OTHER_CATEGORY);
        groups.entry(key.to_string()).or_default().push(listing);
    }
    groups
        .into_iter()
        .map(|(category, group)| {
            let stats = CategoryStats {
                count: group.len(),
                average: average_price(group.iter().copied()),
            };
            (category, stats)
        })
        .collect()
}
