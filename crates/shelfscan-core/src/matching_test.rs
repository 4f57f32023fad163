use chrono::Utc;
use rust_decimal::Decimal;

use super::*;
use crate::ListingOrigin;

fn listing(source: Source, name: &str) -> Listing {
    Listing::new(source, name, Decimal::ONE, ListingOrigin::Live, Utc::now()).unwrap()
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn normalize_name_strips_leading_retailer() {
    assert_eq!(
        normalize_name("Tesco Organic Whole Milk 2 Pints"),
        "organic whole milk 2 pints"
    );
    assert_eq!(normalize_name("B&M  Bagels   5 Pack"), "bagels 5 pack");
    assert_eq!(normalize_name("WHITE ROSE Cheddar"), "cheddar");
}

#[test]
fn normalize_name_strips_repeated_prefixes_only_at_start() {
    assert_eq!(normalize_name("Asda Tesco Milk"), "milk");
    assert_eq!(normalize_name("Milk from Tesco farms"), "milk from tesco farms");
}

#[test]
fn normalize_name_keeps_retailer_word_without_following_text() {
    assert_eq!(normalize_name("Tesco"), "tesco");
    assert_eq!(normalize_name("Tescos Finest"), "tescos finest");
}

#[test]
fn score_identical_names_is_one() {
    assert!(approx(score("Whole Milk", "Whole Milk"), 1.0));
    assert!(approx(score("Tesco Whole Milk", "asda whole   milk"), 1.0));
}

#[test]
fn score_partial_overlap_uses_larger_token_count() {
    // {whole, milk, 2, pints} vs {milk, 2, pints} -> 3 / 4
    assert!(approx(score("Whole Milk 2 Pints", "Milk 2 Pints"), 0.75));
}

#[test]
fn score_disjoint_names_is_zero() {
    assert!(approx(score("Sourdough Bread", "Chicken Wings"), 0.0));
}

#[test]
fn score_empty_input_is_zero() {
    assert!(approx(score("", ""), 0.0));
    assert!(approx(score("Milk", ""), 0.0));
    assert!(approx(score("   ", "Milk"), 0.0));
    assert!(approx(score("Tesco ", "Tesco "), 1.0));
}

#[test]
fn score_is_bounded_and_symmetric() {
    let names = [
        "",
        "Milk",
        "Milk Milk Milk",
        "Semi-Skimmed Milk 2 Pints",
        "Lidl Semi-Skimmed Milk",
        "Costco Kirkland Milk 4 Pints",
    ];
    for a in names {
        for b in names {
            let s = score(a, b);
            assert!((0.0..=1.0).contains(&s), "{a:?} vs {b:?} = {s}");
            assert!(approx(s, score(b, a)));
        }
    }
}

#[test]
fn query_coverage_counts_query_words_found() {
    assert!(approx(query_coverage("milk", "Whole Milk 2 Pints"), 1.0));
    assert!(approx(query_coverage("whole milk", "Skimmed Milk"), 0.5));
    assert!(approx(query_coverage("", "Milk"), 0.0));
}

#[test]
fn annotate_listing_fills_category_and_scales_confidence() {
    let mut l = listing(Source::Tesco, "Whole Milk 2 Pints");
    annotate_listing(&mut l, "milk");
    assert_eq!(l.category.as_deref(), Some("Dairy"));
    assert!(approx(l.match_confidence(), 0.95));

    let mut unrelated = listing(Source::Tesco, "Washing Up Liquid");
    annotate_listing(&mut unrelated, "milk");
    assert!(unrelated.category.is_none());
    assert!(approx(unrelated.match_confidence(), 0.475));
}

#[test]
fn annotate_listing_keeps_existing_category() {
    let mut l = listing(Source::Asda, "Oat Milk 1L");
    l.category = Some("Plant Based".to_string());
    annotate_listing(&mut l, "oat milk");
    assert_eq!(l.category.as_deref(), Some("Plant Based"));
}

#[test]
fn annotate_listing_with_coverage_clamps_out_of_range_values() {
    let mut over = listing(Source::Tesco, "Whole Milk 2 Pints");
    annotate_listing_with_coverage(&mut over, 1.7);
    assert!(approx(over.match_confidence(), 0.95));

    let mut nan = listing(Source::Tesco, "Whole Milk 2 Pints");
    annotate_listing_with_coverage(&mut nan, f64::NAN);
    assert!(approx(nan.match_confidence(), 0.475));
}

#[test]
fn synthetic_listing_never_exceeds_its_base_confidence() {
    let mut synthetic = Listing::new(
        Source::Lidl,
        "milk - Premium Quality",
        Decimal::ONE,
        ListingOrigin::Synthetic,
        Utc::now(),
    )
    .unwrap();
    annotate_listing(&mut synthetic, "milk");
    assert!(synthetic.match_confidence() <= 0.8 + 1e-9);
    assert_eq!(synthetic.origin, ListingOrigin::Synthetic);
}

#[test]
fn bound_confidence_keeps_model_answer_near_word_overlap() {
    assert!(approx(bound_confidence(0.9, 0.8), 0.9));
    assert!(approx(bound_confidence(1.0, 0.2), 0.5));
    assert!(approx(bound_confidence(0.0, 1.0), 0.7));
    assert!(approx(bound_confidence(0.1, 0.1), 0.1));
    assert!(approx(bound_confidence(f64::NAN, 0.4), 0.4));
}

#[test]
fn cross_source_matches_skips_same_source_pairs() {
    let listings = vec![
        listing(Source::Tesco, "Tesco Whole Milk 2 Pints"),
        listing(Source::Tesco, "Whole Milk 2 Pints"),
        listing(Source::Asda, "Asda Whole Milk 2 Pints"),
        listing(Source::Lidl, "Sourdough Bread 400g"),
    ];
    let matches = cross_source_matches(&listings, DEFAULT_MATCH_THRESHOLD);
    assert_eq!(matches.len(), 2);
    assert!(matches
        .iter()
        .all(|m| m.left_source != m.right_source && approx(m.score, 1.0)));
    assert_eq!(matches[0].left_id, listings[0].id);
    assert_eq!(matches[0].right_id, listings[2].id);
}
