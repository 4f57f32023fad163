//! Synthetic listings used when a source cannot be read.

use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use rand::rngs::StdRng;
use rand::Rng;
use rust_decimal::{Decimal, RoundingStrategy};
use shelfscan_core::{Listing, ListingOrigin, Source};

const MILK: [&str; 8] = [
    "Whole Milk 2 Pints",
    "Semi-Skimmed Milk 2 Pints",
    "Skimmed Milk 2 Pints",
    "Organic Whole Milk 2 Pints",
    "Lactose-Free Milk 1L",
    "Goat's Milk 1L",
    "Almond Milk 1L",
    "Soy Milk 1L",
];

const BREAD: [&str; 8] = [
    "White Sliced Bread 800g",
    "Wholemeal Bread 800g",
    "Sourdough Bread 400g",
    "Ciabatta Rolls 4 Pack",
    "Bagels 5 Pack",
    "Croissants 4 Pack",
    "Multigrain Bread 800g",
    "Gluten-Free Bread 400g",
];

const CHICKEN: [&str; 8] = [
    "Chicken Breast Fillets 1kg",
    "Chicken Thighs 1kg",
    "Chicken Wings 500g",
    "Whole Chicken 1.5kg",
    "Organic Chicken Breast 500g",
    "Free-Range Chicken 1kg",
    "Chicken Drumsticks 500g",
    "Chicken Mince 500g",
];

const GENERIC_SUFFIXES: [&str; 8] = [
    "Premium Quality",
    "Standard",
    "Value Pack",
    "Organic",
    "Family Size",
    "Economy",
    "Brand Name",
    "Special Offer",
];

/// Product names to fabricate for `query`.
pub(crate) fn variations(query: &str) -> Vec<String> {
    let query = query.trim();
    let lowered = query.to_lowercase();
    let fixed = if lowered.contains("milk") {
        Some(MILK)
    } else if lowered.contains("bread") {
        Some(BREAD)
    } else if lowered.contains("chicken") {
        Some(CHICKEN)
    } else {
        None
    };

    match fixed {
        Some(names) => names.iter().map(|name| (*name).to_string()).collect(),
        None => GENERIC_SUFFIXES
            .iter()
            .map(|suffix| format!("{query} - {suffix}"))
            .collect(),
    }
}

/// Eight plausible listings for `source`, priced in `[0.99, 8.99)` scaled by
/// `price_multiplier`.
///
/// All randomness (prices and ids) comes from `rng`, so a seeded generator
/// reproduces the same listings.
pub(crate) fn synthetic_listings(
    source: Source,
    query: &str,
    price_multiplier: f64,
    rng: &mut StdRng,
    observed_at: DateTime<Utc>,
) -> Vec<Listing> {
    let image = placeholder_image(source);

    variations(query)
        .into_iter()
        .filter_map(|name| {
            let base = 0.99 + rng.random_range(0.0..8.0);
            let price = Decimal::try_from(base * price_multiplier)
                .ok()?
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            let mut listing =
                Listing::new(source, name, price, ListingOrigin::Synthetic, observed_at).ok()?;
            listing.id = uuid::Builder::from_random_bytes(rng.random()).into_uuid();
            listing.image_ref = Some(image.clone());
            Some(listing)
        })
        .collect()
}

fn placeholder_image(source: Source) -> String {
    format!(
        "https://via.placeholder.com/150x150/{}/FFFFFF?text={}",
        source.placeholder_colour(),
        utf8_percent_encode(source.display_name(), NON_ALPHANUMERIC)
    )
}
