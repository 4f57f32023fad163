//! Deterministic name matching and confidence scoring.
//!
//! Names are normalized (leading retailer names stripped, whitespace
//! collapsed, lower-cased) and compared by word overlap. Scores are advisory:
//! nothing here merges listings.

use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::category::categorize;
use crate::{Listing, Source};

/// Default minimum [`score`] for two listings to be reported as a likely match.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.6;

/// Normalizes a product name for comparison.
///
/// Collapses whitespace, lower-cases, and strips any run of leading retailer
/// names (e.g. `"Tesco Organic Milk"` becomes `"organic milk"`).
#[must_use]
pub fn normalize_name(name: &str) -> String {
    let mut normalized = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    loop {
        let stripped = Source::ALL.iter().find_map(|source| {
            let prefix = source.display_name().to_lowercase();
            normalized
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix(' '))
                .map(str::to_string)
        });
        match stripped {
            Some(rest) => normalized = rest,
            None => return normalized,
        }
    }
}

fn tokens(normalized: &str) -> HashSet<&str> {
    normalized.split(' ').filter(|t| !t.is_empty()).collect()
}

/// Word-overlap similarity of two names in `[0, 1]`.
///
/// Identical normalized names score `1.0`; if either side normalizes to
/// nothing the score is `0.0`. Otherwise it is the number of shared distinct
/// words over the larger distinct word count.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn score(name_a: &str, name_b: &str) -> f64 {
    let a = normalize_name(name_a);
    let b = normalize_name(name_b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let tokens_a = tokens(&a);
    let tokens_b = tokens(&b);
    let shared = tokens_a.intersection(&tokens_b).count();
    let larger = tokens_a.len().max(tokens_b.len());
    shared as f64 / larger as f64
}

/// Fraction of the query's distinct words that appear in `name`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn query_coverage(query: &str, name: &str) -> f64 {
    let q = normalize_name(query);
    let n = normalize_name(name);
    let query_tokens = tokens(&q);
    if query_tokens.is_empty() {
        return 0.0;
    }
    let name_tokens = tokens(&n);
    let found = query_tokens.intersection(&name_tokens).count();
    found as f64 / query_tokens.len() as f64
}

/// Scores a freshly extracted listing against the query it was collected for.
///
/// Fills `category` when absent and scales the listing's current confidence
/// by how much of the query its name covers: full coverage keeps it, no
/// coverage halves it.
///
/// Scaling never raises a listing above its origin's base confidence, so
/// synthetic listings stay at or below 0.8. A well-matched synthetic listing
/// can still outscore a poorly matched live one; `origin` is the field that
/// tells them apart.
pub fn annotate_listing(listing: &mut Listing, query: &str) {
    let coverage = query_coverage(query, &listing.raw_name);
    annotate_listing_with_coverage(listing, coverage);
}

/// [`annotate_listing`] with a coverage value supplied by the caller, e.g. a
/// model answer already passed through [`bound_confidence`].
pub fn annotate_listing_with_coverage(listing: &mut Listing, coverage: f64) {
    if listing.category.is_none() {
        listing.category = categorize(&listing.raw_name).map(str::to_string);
    }
    let coverage = if coverage.is_nan() { 0.0 } else { coverage.clamp(0.0, 1.0) };
    let confidence = listing.match_confidence() * (0.5 + 0.5 * coverage);
    listing.set_match_confidence(confidence);
}

/// Furthest an externally supplied confidence may move from the word-overlap value.
pub const MAX_CONFIDENCE_DEVIATION: f64 = 0.3;

/// Keeps an externally supplied confidence within [`MAX_CONFIDENCE_DEVIATION`]
/// of the deterministic value and inside `[0, 1]`. NaN yields the
/// deterministic value.
#[must_use]
pub fn bound_confidence(external: f64, deterministic: f64) -> f64 {
    let deterministic = deterministic.clamp(0.0, 1.0);
    if external.is_nan() {
        return deterministic;
    }
    let low = (deterministic - MAX_CONFIDENCE_DEVIATION).max(0.0);
    let high = (deterministic + MAX_CONFIDENCE_DEVIATION).min(1.0);
    external.clamp(low, high)
}

/// Two listings from different sources whose names look like the same product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossSourceMatch {
    pub left_id: Uuid,
    pub left_source: Source,
    pub right_id: Uuid,
    pub right_source: Source,
    pub score: f64,
}

/// Pairs of listings from different sources scoring at least `threshold`,
/// in input order.
#[must_use]
pub fn cross_source_matches(listings: &[Listing], threshold: f64) -> Vec<CrossSourceMatch> {
    let mut matches = Vec::new();
    for (i, left) in listings.iter().enumerate() {
        for right in &listings[i + 1..] {
            if left.source == right.source {
                continue;
            }
            let s = score(&left.raw_name, &right.raw_name);
            if s >= threshold {
                matches.push(CrossSourceMatch {
                    left_id: left.id,
                    left_source: left.source,
                    right_id: right.id,
                    right_source: right.source,
                    score: s,
                });
            }
        }
    }
    matches
}

#[cfg(test)]
#[path = "matching_test.rs"]
mod tests;
