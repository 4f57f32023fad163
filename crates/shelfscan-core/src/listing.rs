use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::normalize::{normalize_listing, PER_ITEM};
use crate::{CoreError, Source};

/// How a listing came into existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingOrigin {
    /// Extracted from a fetched page by a source's selector rules.
    Live,
    /// Structured by the text-completion capability from raw page text.
    AiExtracted,
    /// Recovered by the regex fallback from raw page text.
    PatternMatched,
    /// Generated by a source's synthetic fallback.
    Synthetic,
}

impl ListingOrigin {
    /// Starting `match_confidence` for a listing of this origin.
    #[must_use]
    pub fn base_confidence(self) -> f64 {
        match self {
            ListingOrigin::Live => 0.95,
            ListingOrigin::AiExtracted => 0.9,
            ListingOrigin::Synthetic => 0.8,
            ListingOrigin::PatternMatched => 0.7,
        }
    }
}

/// One observed product offer from one source.
///
/// `price` is never negative and `match_confidence` is always within `[0, 1]`.
/// `price_per_unit` and `unit_label` are only ever written by
/// [`normalize_listing`]; deserialized listings are re-normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ListingRecord")]
pub struct Listing {
    pub id: Uuid,
    pub raw_name: String,
    pub source: Source,
    price: Decimal,
    price_per_unit: Option<Decimal>,
    unit_label: String,
    /// Raw quantity/size fragment captured alongside the name, e.g. `"£0.53/litre"`.
    pub size_text: Option<String>,
    /// Lower member price, when the source advertises one.
    pub loyalty_price: Option<Decimal>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub in_stock: bool,
    pub image_ref: Option<String>,
    pub page_ref: Option<String>,
    pub observed_at: DateTime<Utc>,
    match_confidence: f64,
    pub origin: ListingOrigin,
}

impl Listing {
    /// Creates a listing with a fresh random id and the origin's base confidence.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NegativePrice`] if `price` is below zero.
    pub fn new(
        source: Source,
        raw_name: impl Into<String>,
        price: Decimal,
        origin: ListingOrigin,
        observed_at: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        if price < Decimal::ZERO {
            return Err(CoreError::NegativePrice(price));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            raw_name: raw_name.into(),
            source,
            price,
            price_per_unit: None,
            unit_label: PER_ITEM.to_string(),
            size_text: None,
            loyalty_price: None,
            brand: None,
            category: None,
            description: None,
            in_stock: true,
            image_ref: None,
            page_ref: None,
            observed_at,
            match_confidence: origin.base_confidence(),
            origin,
        })
    }

    #[must_use]
    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Price divided by the parsed base quantity, once normalized.
    #[must_use]
    pub fn price_per_unit(&self) -> Option<Decimal> {
        self.price_per_unit
    }

    #[must_use]
    pub fn unit_label(&self) -> &str {
        &self.unit_label
    }

    #[must_use]
    pub fn match_confidence(&self) -> f64 {
        self.match_confidence
    }

    /// Sets the confidence, clamped into `[0, 1]`. `NaN` becomes `0.0`.
    pub fn set_match_confidence(&mut self, confidence: f64) {
        self.match_confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
    }

    /// A candidate is only kept when it has a name and a strictly positive price.
    #[must_use]
    pub fn is_admissible(&self) -> bool {
        !self.raw_name.trim().is_empty() && self.price > Decimal::ZERO
    }

    pub(crate) fn set_unit_pricing(&mut self, price_per_unit: Decimal, unit_label: &str) {
        self.price_per_unit = Some(price_per_unit);
        self.unit_label = unit_label.to_string();
    }
}

/// Wire shape accepted when deserializing a [`Listing`]. Derived fields are
/// read but ignored and recomputed.
#[derive(Deserialize)]
struct ListingRecord {
    id: Uuid,
    raw_name: String,
    source: Source,
    price: Decimal,
    #[serde(default)]
    size_text: Option<String>,
    #[serde(default)]
    loyalty_price: Option<Decimal>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default = "default_in_stock")]
    in_stock: bool,
    #[serde(default)]
    image_ref: Option<String>,
    #[serde(default)]
    page_ref: Option<String>,
    observed_at: DateTime<Utc>,
    match_confidence: f64,
    origin: ListingOrigin,
}

fn default_in_stock() -> bool {
    true
}

impl TryFrom<ListingRecord> for Listing {
    type Error = CoreError;

    fn try_from(record: ListingRecord) -> Result<Self, Self::Error> {
        let mut listing = Listing::new(
            record.source,
            record.raw_name,
            record.price,
            record.origin,
            record.observed_at,
        )?;
        listing.id = record.id;
        listing.size_text = record.size_text;
        listing.loyalty_price = record.loyalty_price;
        listing.brand = record.brand;
        listing.category = record.category;
        listing.description = record.description;
        listing.in_stock = record.in_stock;
        listing.image_ref = record.image_ref;
        listing.page_ref = record.page_ref;
        listing.set_match_confidence(record.match_confidence);
        normalize_listing(&mut listing);
        Ok(listing)
    }
}
