use chrono::Utc;

use super::*;
use crate::{ListingOrigin, Source};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// -----------------------------------------------------------------------
// parse_price
// -----------------------------------------------------------------------

#[test]
fn parse_price_strips_currency_symbol() {
    assert_eq!(parse_price("£1.20"), Some(dec("1.20")));
}

#[test]
fn parse_price_discards_surrounding_text() {
    assert_eq!(parse_price("Now only £12.50 each"), Some(dec("12.50")));
    assert_eq!(parse_price("3.99 GBP"), Some(dec("3.99")));
}

#[test]
fn parse_price_does_not_interpret_pence() {
    assert_eq!(parse_price("85p"), Some(dec("85")));
}

#[test]
fn parse_price_empty_or_non_numeric_is_none() {
    assert_eq!(parse_price(""), None);
    assert_eq!(parse_price("Out of stock"), None);
    assert_eq!(parse_price("£"), None);
}

#[test]
fn parse_price_rejects_multiple_decimal_points() {
    assert_eq!(parse_price("1.2.3"), None);
}

// -----------------------------------------------------------------------
// extract_quantity
// -----------------------------------------------------------------------

#[test]
fn extract_quantity_pints() {
    let q = extract_quantity("Tesco Organic Whole Milk 2 Pints").unwrap();
    assert_eq!(q.unit, "pint");
    assert_eq!(q.base_amount, dec("1136.52"));
}

#[test]
fn extract_quantity_kilograms_and_grams() {
    assert_eq!(
        extract_quantity("Chicken Thighs 1kg").unwrap().base_amount,
        dec("1000")
    );
    assert_eq!(
        extract_quantity("White Sliced Bread 800g").unwrap().base_amount,
        dec("800")
    );
    assert_eq!(
        extract_quantity("Whole Chicken 1.5KG").unwrap().base_amount,
        dec("1500")
    );
}

#[test]
fn extract_quantity_litres_and_millilitres() {
    assert_eq!(
        extract_quantity("Almond Milk 1L").unwrap().base_amount,
        dec("1000")
    );
    assert_eq!(
        extract_quantity("Orange Juice 1 litre").unwrap().base_amount,
        dec("1000")
    );
    assert_eq!(
        extract_quantity("Cola 330 ml can").unwrap().base_amount,
        dec("330")
    );
}

#[test]
fn extract_quantity_requires_unit_word_boundary() {
    assert_eq!(extract_quantity("Free Range Eggs 6 large"), None);
    assert_eq!(extract_quantity("Ciabatta Rolls 4 Pack"), None);
}

#[test]
fn extract_quantity_takes_first_match() {
    let q = extract_quantity("Yogurt 4 x 125g (500g)").unwrap();
    assert_eq!(q.base_amount, dec("125"));
}

// -----------------------------------------------------------------------
// compute_price_per_unit
// -----------------------------------------------------------------------

#[test]
fn compute_price_per_unit_rounds_to_four_places() {
    let ppu = compute_price_per_unit(Some(dec("1.20")), "Whole Milk 2 Pints", None);
    assert_eq!(ppu, dec("0.0011"));
}

#[test]
fn compute_price_per_unit_uses_size_text() {
    let ppu = compute_price_per_unit(Some(dec("2.00")), "Cheddar", Some("400g"));
    assert_eq!(ppu, dec("0.0050"));
}

#[test]
fn compute_price_per_unit_without_quantity_returns_price() {
    let ppu = compute_price_per_unit(Some(dec("3.49")), "Bagels 5 Pack", None);
    assert_eq!(ppu, dec("3.49"));
}

#[test]
fn compute_price_per_unit_zero_or_missing_price_is_zero() {
    assert_eq!(
        compute_price_per_unit(Some(Decimal::ZERO), "Milk 1L", None),
        Decimal::ZERO
    );
    assert_eq!(compute_price_per_unit(None, "Milk 1L", None), Decimal::ZERO);
}

#[test]
fn compute_price_per_unit_rounds_half_up() {
    // 0.00125 per gram -> 0.0013
    let ppu = compute_price_per_unit(Some(dec("0.25")), "Sample 200g", None);
    assert_eq!(ppu, dec("0.0013"));
}

#[test]
fn compute_price_per_unit_decreases_as_quantity_grows() {
    let price = Some(dec("4.00"));
    let sizes = ["100g", "250g", "500g", "1kg", "2kg"];
    let values: Vec<Decimal> = sizes
        .iter()
        .map(|s| compute_price_per_unit(price, "Rice", Some(s)))
        .collect();
    for pair in values.windows(2) {
        assert!(pair[0] >= pair[1], "{values:?}");
    }
}

#[test]
fn extract_quantity_too_large_to_convert_is_none() {
    assert_eq!(
        extract_quantity("Mega Pack 9999999999999999999999999999 kg"),
        None
    );
}

#[test]
fn compute_price_per_unit_overflowing_quantity_returns_price() {
    let ppu = compute_price_per_unit(
        Some(Decimal::ONE),
        "Mega Pack 9999999999999999999999999999 kg",
        None,
    );
    assert_eq!(ppu, Decimal::ONE);
}

#[test]
fn compute_price_per_unit_overflowing_division_returns_price() {
    let ppu = compute_price_per_unit(
        Some(Decimal::MAX),
        "Glitter 0.0000000000000000000000001g",
        None,
    );
    assert_eq!(ppu, Decimal::MAX);
}

// -----------------------------------------------------------------------
// normalize_unit_label
// -----------------------------------------------------------------------

#[test]
fn normalize_unit_label_maps_known_units() {
    assert_eq!(normalize_unit_label(Some("kg")), PER_100G);
    assert_eq!(normalize_unit_label(Some("g")), PER_100G);
    assert_eq!(normalize_unit_label(Some("ml")), PER_LITRE);
    assert_eq!(normalize_unit_label(Some("Litres")), PER_LITRE);
    assert_eq!(normalize_unit_label(Some("liter")), PER_LITRE);
    assert_eq!(normalize_unit_label(Some("PINT")), PER_PINT);
}

#[test]
fn normalize_unit_label_defaults_to_per_item() {
    assert_eq!(normalize_unit_label(None), PER_ITEM);
    assert_eq!(normalize_unit_label(Some("each")), PER_ITEM);
    assert_eq!(normalize_unit_label(Some("")), PER_ITEM);
}

// -----------------------------------------------------------------------
// normalize_listing
// -----------------------------------------------------------------------

#[test]
fn normalize_listing_fills_unit_pricing() {
    let mut listing = Listing::new(
        Source::Tesco,
        "Tesco Organic Whole Milk 2 Pints",
        dec("1.20"),
        ListingOrigin::Live,
        Utc::now(),
    )
    .unwrap();
    normalize_listing(&mut listing);
    assert_eq!(listing.price_per_unit(), Some(dec("0.0011")));
    assert_eq!(listing.unit_label(), PER_PINT);
}

#[test]
fn normalize_listing_without_quantity_is_per_item() {
    let mut listing = Listing::new(
        Source::Asda,
        "Croissants 4 Pack",
        dec("1.75"),
        ListingOrigin::Live,
        Utc::now(),
    )
    .unwrap();
    normalize_listing(&mut listing);
    assert_eq!(listing.price_per_unit(), Some(dec("1.75")));
    assert_eq!(listing.unit_label(), PER_ITEM);
}

#[test]
fn normalize_listing_with_unconvertible_quantity_is_per_item() {
    let mut listing = Listing::new(
        Source::Lidl,
        "Mega Pack 9999999999999999999999999999 kg",
        dec("4.99"),
        ListingOrigin::Live,
        Utc::now(),
    )
    .unwrap();
    normalize_listing(&mut listing);
    assert_eq!(listing.price_per_unit(), Some(dec("4.99")));
    assert_eq!(listing.unit_label(), PER_ITEM);
}
