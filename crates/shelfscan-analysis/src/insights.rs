//! Fixed-template findings over a listing set.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use shelfscan_core::{Listing, Source};

use crate::stats::{self, CategoryStats, SourceStats};

pub const NO_DATA_INSIGHT: &str = "No products available for analysis";

/// The five findings, always in the same order: average price, price range,
/// price spread, best value source, most expensive category.
///
/// An empty set yields exactly [`NO_DATA_INSIGHT`].
#[must_use]
pub fn insights(listings: &[Listing]) -> Vec<String> {
    if listings.is_empty() {
        return vec![NO_DATA_INSIGHT.to_string()];
    }

    let (min, max) = listings
        .iter()
        .map(Listing::price)
        .fold((Decimal::MAX, Decimal::MIN), |(lo, hi), p| (lo.min(p), hi.max(p)));
    let sources = stats::per_source_stats(listings);
    let categories = stats::per_category_stats(listings);

    let mut findings = vec![
        format!(
            "Average price across all sources: £{:.2}",
            stats::average_price(listings)
        ),
        format!("Price range: £{min:.2} - £{max:.2}"),
        format!("Price spread: £{:.2}", stats::price_spread(listings)),
    ];
    if let Some(source) = best_value_source(&sources) {
        findings.push(format!("Best value source: {}", source.display_name()));
    }
    if let Some(category) = most_expensive_category(&categories) {
        findings.push(format!("Most expensive category: {category}"));
    }
    findings
}

/// Lowest average price; the earliest declared source wins ties.
fn best_value_source(sources: &BTreeMap<Source, SourceStats>) -> Option<Source> {
    sources
        .iter()
        .fold(None::<(Source, Decimal)>, |best, (source, s)| match best {
            Some((_, avg)) if avg <= s.average => best,
            _ => Some((*source, s.average)),
        })
        .map(|(source, _)| source)
}

/// Highest average price; alphabetical order wins ties.
fn most_expensive_category(categories: &BTreeMap<String, CategoryStats>) -> Option<&str> {
    categories
        .iter()
        .fold(None::<(&str, Decimal)>, |best, (name, s)| match best {
            Some((_, avg)) if avg >= s.average => best,
            _ => Some((name.as_str(), s.average)),
        })
        .map(|(name, _)| name)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use shelfscan_core::ListingOrigin;

    use super::*;

    fn listing(source: Source, price: i64, category: Option<&str>) -> Listing {
        let mut l = Listing::new(
            source,
            "Item",
            Decimal::new(price, 2),
            ListingOrigin::Live,
            Utc::now(),
        )
        .unwrap();
        l.category = category.map(str::to_string);
        l
    }

    #[test]
    fn empty_set_reports_no_data_only() {
        assert_eq!(insights(&[]), vec![NO_DATA_INSIGHT.to_string()]);
    }

    #[test]
    fn five_findings_in_template_order() {
        let set = [
            listing(Source::Tesco, 100, Some("Dairy")),
            listing(Source::Asda, 200, Some("Bakery")),
            listing(Source::Lidl, 300, None),
        ];
        assert_eq!(
            insights(&set),
            vec![
                "Average price across all sources: £2.00",
                "Price range: £1.00 - £3.00",
                "Price spread: £2.00",
                "Best value source: Tesco",
                "Most expensive category: Other",
            ]
        );
    }

    #[test]
    fn ties_go_to_declaration_and_alphabetical_order() {
        let set = [
            listing(Source::WhiteRose, 150, Some("Meat")),
            listing(Source::Asda, 150, Some("Bakery")),
        ];
        let found = insights(&set);
        assert_eq!(found[3], "Best value source: Asda");
        assert_eq!(found[4], "Most expensive category: Bakery");
    }

    #[test]
    fn display_name_used_for_source() {
        let found = insights(&[listing(Source::BM, 99, None)]);
        assert_eq!(found[3], "Best value source: B&M");
        assert_eq!(found[1], "Price range: £0.99 - £0.99");
        assert_eq!(found[2], "Price spread: £0.00");
    }
}
