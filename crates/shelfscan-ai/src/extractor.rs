use std::sync::{Arc, LazyLock};

use chrono::Utc;
use regex::Regex;
use shelfscan_core::normalize::normalize_listing;
use shelfscan_core::{matching, Listing, ListingOrigin, Source};

use crate::completion::TextCompletion;
use crate::parse::{parse_records, ExtractedRecord};
use crate::pattern::extract_priced_lines;
use crate::prompts;

static BRAND_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z][a-zA-Z&]+)\s+").expect("valid regex"));

/// What [`AiExtractor::extract_brand`] answers when no brand can be found.
pub const UNKNOWN_BRAND: &str = "Unknown";

/// Completion-backed extraction with a deterministic fallback for every operation.
///
/// None of the methods return errors: capability failures and unusable
/// responses are logged and answered by the fallback instead.
#[derive(Clone)]
pub struct AiExtractor {
    completion: Arc<dyn TextCompletion>,
}

impl AiExtractor {
    #[must_use]
    pub fn new(completion: Arc<dyn TextCompletion>) -> Self {
        Self { completion }
    }

    /// Turns raw page text into normalized listings.
    ///
    /// Records from the model get [`ListingOrigin::AiExtracted`]. When the call
    /// fails or yields no admissible record, priced lines are pulled out of
    /// `raw_text` by pattern instead ([`ListingOrigin::PatternMatched`]).
    pub async fn extract_structured(&self, raw_text: &str, source: Source) -> Vec<Listing> {
        if raw_text.trim().is_empty() {
            return Vec::new();
        }

        match self
            .completion
            .complete(&prompts::extraction(raw_text, source))
            .await
        {
            Ok(response) => {
                let listings: Vec<Listing> = parse_records(&response)
                    .into_iter()
                    .filter_map(|record| record_to_listing(record, source))
                    .collect();
                if !listings.is_empty() {
                    tracing::debug!(
                        source = %source,
                        count = listings.len(),
                        "structured listings from completion"
                    );
                    return listings;
                }
                tracing::warn!(
                    source = %source,
                    "completion response had no usable records; using pattern extraction"
                );
            }
            Err(e) => {
                tracing::warn!(
                    source = %source,
                    error = %e,
                    "structured extraction failed; using pattern extraction"
                );
            }
        }

        pattern_listings(raw_text, source)
    }

    /// Normalized form of a product name.
    pub async fn normalize_name(&self, name: &str) -> String {
        match self.completion.complete(&prompts::normalize_name(name)).await {
            Ok(response) => match bare_value(&response) {
                Some(value) => value,
                None => {
                    tracing::warn!(name, "empty normalize response; using deterministic normalization");
                    matching::normalize_name(name)
                }
            },
            Err(e) => {
                tracing::warn!(name, error = %e, "normalize call failed; using deterministic normalization");
                matching::normalize_name(name)
            }
        }
    }

    /// Brand of a product, or `"Unknown"`.
    pub async fn extract_brand(&self, name: &str) -> String {
        match self.completion.complete(&prompts::brand(name)).await {
            Ok(response) => match bare_value(&response) {
                Some(value) => value,
                None => {
                    tracing::warn!(name, "empty brand response; using brand prefix pattern");
                    brand_from_prefix(name)
                }
            },
            Err(e) => {
                tracing::warn!(name, error = %e, "brand call failed; using brand prefix pattern");
                brand_from_prefix(name)
            }
        }
    }

    /// Similarity of two product names in `[0, 1]`.
    ///
    /// Model answers that are not a number within `[0, 1]` are discarded in
    /// favour of [`matching::score`].
    pub async fn match_confidence(&self, name_a: &str, name_b: &str) -> f64 {
        match self
            .completion
            .complete(&prompts::confidence(name_a, name_b))
            .await
        {
            Ok(response) => {
                let parsed = bare_value(&response).and_then(|v| v.parse::<f64>().ok());
                match parsed {
                    Some(value) if (0.0..=1.0).contains(&value) => value,
                    _ => {
                        tracing::warn!(
                            response = response.trim(),
                            "unusable confidence response; using word overlap score"
                        );
                        matching::score(name_a, name_b)
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "confidence call failed; using word overlap score");
                matching::score(name_a, name_b)
            }
        }
    }
}

/// First non-empty line of a response with surrounding quotes removed.
fn bare_value(response: &str) -> Option<String> {
    let line = response.lines().map(str::trim).find(|l| !l.is_empty())?;
    let unquoted = line.trim_matches(|c| c == '"' || c == '\'').trim();
    (!unquoted.is_empty()).then(|| unquoted.to_string())
}

fn brand_from_prefix(name: &str) -> String {
    BRAND_PREFIX_RE
        .captures(name.trim())
        .map_or_else(|| UNKNOWN_BRAND.to_string(), |caps| caps[1].to_string())
}

fn record_to_listing(record: ExtractedRecord, source: Source) -> Option<Listing> {
    let price = record.price?;
    let mut listing = Listing::new(
        source,
        record.name,
        price,
        ListingOrigin::AiExtracted,
        Utc::now(),
    )
    .ok()?;
    listing.size_text = record.unit;
    listing.brand = record.brand.filter(|b| b != UNKNOWN_BRAND);
    listing.category = record.category;
    listing.in_stock = record.in_stock;
    listing.description = record.description;
    if !listing.is_admissible() {
        return None;
    }
    normalize_listing(&mut listing);
    Some(listing)
}

fn pattern_listings(raw_text: &str, source: Source) -> Vec<Listing> {
    let observed_at = Utc::now();
    extract_priced_lines(raw_text)
        .into_iter()
        .filter_map(|(name, price)| {
            let mut listing =
                Listing::new(source, name, price, ListingOrigin::PatternMatched, observed_at)
                    .ok()?;
            if !listing.is_admissible() {
                return None;
            }
            normalize_listing(&mut listing);
            Some(listing)
        })
        .collect()
}

#[cfg(test)]
#[path = "extractor_test.rs"]
mod tests;
