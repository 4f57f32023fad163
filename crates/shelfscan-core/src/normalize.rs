//! Price and unit normalization.
//!
//! Turns scraped price text into a [`Decimal`] and derives a comparable
//! price-per-unit from the quantity found in a listing's name or size text.
//! Quantities are converted to a base of grams or millilitres before dividing.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::Listing;

pub const PER_100G: &str = "per 100g";
pub const PER_LITRE: &str = "per litre";
pub const PER_PINT: &str = "per pint";
pub const PER_ITEM: &str = "per item";

/// Decimal places kept on a computed price-per-unit.
const UNIT_PRICE_DP: u32 = 4;

static QUANTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(kg|ml|litres?|liters?|l|g|pints?)\b").expect("valid regex")
});

/// A quantity found in listing text, converted to grams or millilitres.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quantity {
    pub base_amount: Decimal,
    /// Unit as written, lower-cased and singular (`"pint"`, `"kg"`, ...).
    pub unit: String,
}

/// Parses a price from free text by discarding everything except digits and `.`.
///
/// Currency symbols are not interpreted, only dropped: `"£1.20"` and `"1.20 GBP"`
/// both give `1.20`. Returns `None` when nothing numeric remains or the
/// remainder is not a valid decimal (e.g. `"1.2.3"`).
#[must_use]
pub fn parse_price(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

/// Finds the first `<number><unit>` in `text` and converts it to a base quantity.
///
/// An amount too large to convert is treated as no quantity.
#[must_use]
pub fn extract_quantity(text: &str) -> Option<Quantity> {
    let caps = QUANTITY_RE.captures(text)?;
    let amount = Decimal::from_str(caps.get(1)?.as_str()).ok()?;
    let unit = singular_unit(caps.get(2)?.as_str());

    let multiplier = match unit.as_str() {
        "kg" | "l" | "litre" | "liter" => Decimal::ONE_THOUSAND,
        "pint" => Decimal::new(56_826, 2),
        _ => Decimal::ONE,
    };

    Some(Quantity {
        base_amount: amount.checked_mul(multiplier)?,
        unit,
    })
}

/// Price divided by the base quantity parsed from `name` and `size`, rounded
/// to 4 dp half-up.
///
/// A missing or zero price yields zero. When no quantity can be parsed, or
/// the division overflows, the price is returned unchanged, i.e. the listing
/// is treated as one item.
#[must_use]
pub fn compute_price_per_unit(price: Option<Decimal>, name: &str, size: Option<&str>) -> Decimal {
    let Some(price) = price.filter(|p| !p.is_zero()) else {
        return Decimal::ZERO;
    };

    let text = combined_text(name, size);
    match extract_quantity(&text) {
        Some(q) if q.base_amount > Decimal::ZERO => price
            .checked_div(q.base_amount)
            .map_or(price, |per_unit| {
                per_unit.round_dp_with_strategy(UNIT_PRICE_DP, RoundingStrategy::MidpointAwayFromZero)
            }),
        _ => price,
    }
}

/// Maps a free-text unit hint onto one of the canonical display labels.
#[must_use]
pub fn normalize_unit_label(hint: Option<&str>) -> &'static str {
    let Some(hint) = hint else {
        return PER_ITEM;
    };
    match singular_unit(hint.trim()).as_str() {
        "kg" | "g" => PER_100G,
        "l" | "ml" | "litre" | "liter" => PER_LITRE,
        "pint" => PER_PINT,
        _ => PER_ITEM,
    }
}

/// Fills a listing's `price_per_unit` and `unit_label` from its price, name
/// and size text.
pub fn normalize_listing(listing: &mut Listing) {
    let text = combined_text(&listing.raw_name, listing.size_text.as_deref());
    let unit = extract_quantity(&text).map(|q| q.unit);
    let per_unit = compute_price_per_unit(
        Some(listing.price()),
        &listing.raw_name,
        listing.size_text.as_deref(),
    );
    listing.set_unit_pricing(per_unit, normalize_unit_label(unit.as_deref()));
}

fn combined_text(name: &str, size: Option<&str>) -> String {
    match size {
        Some(size) if !size.trim().is_empty() => format!("{name} {size}"),
        _ => name.to_string(),
    }
}

fn singular_unit(raw: &str) -> String {
    let lower = raw.to_lowercase();
    match lower.as_str() {
        "pints" | "litres" | "liters" => lower[..lower.len() - 1].to_string(),
        _ => lower,
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
