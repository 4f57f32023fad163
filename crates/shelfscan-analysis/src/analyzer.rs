use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use shelfscan_core::matching::{cross_source_matches, CrossSourceMatch, DEFAULT_MATCH_THRESHOLD};
use shelfscan_core::{Listing, Source, SourceProfiles};

use crate::insights;
use crate::ranking::{self, Recommendation, SortOrder};
use crate::stats::{self, CategoryStats, SourceStats};

/// Aggregate view over one merged listing set.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    pub query: String,
    pub listings: Vec<Listing>,
    pub total_count: usize,
    pub cheapest_source: Option<Source>,
    pub average_price: Decimal,
    pub price_spread: Decimal,
    /// Same value as `price_spread`: what switching from the dearest to the
    /// cheapest listing would save.
    pub max_savings: Decimal,
    pub per_source_stats: BTreeMap<Source, SourceStats>,
    pub per_category_stats: BTreeMap<String, CategoryStats>,
    pub insights: Vec<String>,
    pub recommendations: Vec<Recommendation>,
    /// Listing pairs from different sources that look like the same product.
    pub cross_source_matches: Vec<CrossSourceMatch>,
}

/// Comparison and recommendation engine, parameterized by source reputation.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    profiles: SourceProfiles,
}

impl Analyzer {
    #[must_use]
    pub fn new(profiles: SourceProfiles) -> Self {
        Self { profiles }
    }

    #[must_use]
    pub fn profiles(&self) -> &SourceProfiles {
        &self.profiles
    }

    /// Full comparison of `listings`; `order` only affects the `listings` view.
    #[must_use]
    pub fn compare(&self, query: &str, listings: &[Listing], order: SortOrder) -> ComparisonResult {
        let mut sorted = listings.to_vec();
        ranking::sort_listings(&mut sorted, order, &self.profiles);
        let spread = stats::price_spread(listings);

        let result = ComparisonResult {
            query: query.trim().to_string(),
            total_count: listings.len(),
            cheapest_source: stats::cheapest_source(listings),
            average_price: stats::average_price(listings),
            price_spread: spread,
            max_savings: spread,
            per_source_stats: stats::per_source_stats(listings),
            per_category_stats: stats::per_category_stats(listings),
            insights: insights::insights(listings),
            recommendations: self.recommend(listings, None, None),
            cross_source_matches: cross_source_matches(listings, DEFAULT_MATCH_THRESHOLD),
            listings: sorted,
        };
        tracing::debug!(
            query = %result.query,
            total = result.total_count,
            matches = result.cross_source_matches.len(),
            "comparison computed"
        );
        result
    }

    /// Up to ten listings ranked by weighted score, after the optional
    /// budget ceiling and category filters.
    #[must_use]
    pub fn recommend(
        &self,
        listings: &[Listing],
        budget: Option<&str>,
        category: Option<&str>,
    ) -> Vec<Recommendation> {
        ranking::recommend(listings, budget, category, &self.profiles)
    }

    #[must_use]
    pub fn insights(&self, listings: &[Listing]) -> Vec<String> {
        insights::insights(listings)
    }
}

#[cfg(test)]
#[path = "analyzer_test.rs"]
mod tests;
