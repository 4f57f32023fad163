use super::*;

fn item(fields: [&[&str]; 6]) -> PageItem {
    PageItem {
        fragments: fields
            .iter()
            .map(|f| f.iter().map(|s| (*s).to_string()).collect())
            .collect(),
        text: String::new(),
    }
}

fn page(items: Vec<PageItem>) -> FetchedPage {
    FetchedPage {
        url: "https://www.tesco.com/groceries/en-GB/search?query=milk".to_string(),
        items,
    }
}

fn tesco() -> SelectorStrategy {
    SelectorStrategy::new(Source::Tesco, rules_for(Source::Tesco).unwrap())
}

#[test]
fn search_url_encodes_query() {
    assert_eq!(
        search_url(Source::Tesco, TESCO.search_path, " semi skimmed milk "),
        "https://www.tesco.com/groceries/en-GB/search?query=semi%20skimmed%20milk"
    );
    assert_eq!(
        search_url(Source::Asda, ASDA.search_path, "milk"),
        "https://groceries.asda.com/search/milk"
    );
}

#[test]
fn every_grocery_source_has_rules() {
    for source in Source::ALL {
        assert_eq!(rules_for(source).is_none(), source == Source::HotDeals);
    }
}

#[test]
fn resolve_ref_handles_relative_and_absolute() {
    assert_eq!(
        resolve_ref(Source::Asda, "/groceries/product/1").as_deref(),
        Some("https://groceries.asda.com/groceries/product/1")
    );
    assert_eq!(
        resolve_ref(Source::Lidl, "p/123").as_deref(),
        Some("https://www.lidl.co.uk/p/123")
    );
    assert_eq!(
        resolve_ref(Source::Tesco, "//digitalcontent.api.tesco.com/a.jpg").as_deref(),
        Some("https://digitalcontent.api.tesco.com/a.jpg")
    );
    assert_eq!(
        resolve_ref(Source::Tesco, "https://img.tesco.com/a.jpg").as_deref(),
        Some("https://img.tesco.com/a.jpg")
    );
    assert_eq!(resolve_ref(Source::Tesco, "data:image/gif;base64,R0lG"), None);
    assert_eq!(resolve_ref(Source::Tesco, "  "), None);
}

#[test]
fn page_request_lists_fields_in_fixed_order() {
    let request = tesco().page_request("milk", Duration::from_secs(15));
    assert_eq!(request.item_selector.as_deref(), Some("li.product-list--list-item"));
    assert_eq!(request.fields.len(), 6);
    assert_eq!(request.fields[IMAGE].attribute.as_deref(), Some("src"));
    assert_eq!(request.fields[LINK].attribute.as_deref(), Some("href"));
    assert_eq!(request.navigation_timeout, Duration::from_secs(15));
}

#[test]
fn extract_builds_live_listings() {
    let page = page(vec![item([
        &["Tesco Whole Milk 2 Pints"],
        &["£1.45"],
        &["£0.73/pint"],
        &["https://img.tesco.com/1.jpg"],
        &["/groceries/en-GB/products/1"],
        &["£1.25 Clubcard Price"],
    ])]);
    let listings = tesco().extract(&page, Utc::now());
    assert_eq!(listings.len(), 1);
    let milk = &listings[0];
    assert_eq!(milk.origin, ListingOrigin::Live);
    assert_eq!(milk.price(), rust_decimal::Decimal::new(145, 2));
    assert_eq!(milk.loyalty_price, Some(rust_decimal::Decimal::new(125, 2)));
    assert_eq!(milk.size_text.as_deref(), Some("£0.73/pint"));
    assert_eq!(
        milk.page_ref.as_deref(),
        Some("https://www.tesco.com/groceries/en-GB/products/1")
    );
}

#[test]
fn extract_ignores_loyalty_price_not_below_shelf_price() {
    let page = page(vec![item([
        &["Tesco Bread 800g"],
        &["£1.10"],
        &[],
        &[],
        &[],
        &["Any 3 for £5"],
    ])]);
    let listings = tesco().extract(&page, Utc::now());
    assert_eq!(listings[0].loyalty_price, None);
}

#[test]
fn extract_discards_inadmissible_candidates() {
    let page = page(vec![
        item([&["No price here"], &[], &[], &[], &[], &[]]),
        item([&[], &["£2.00"], &[], &[], &[], &[]]),
        item([&["Free sample"], &["£0.00"], &[], &[], &[], &[]]),
        item([&["Butter 250g"], &["Price unavailable"], &[], &[], &[], &[]]),
        item([&["Butter 250g"], &["£1.99"], &[], &[], &[], &[]]),
    ]);
    let listings = tesco().extract(&page, Utc::now());
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].raw_name, "Butter 250g");
}

#[test]
fn page_request_keeps_candidates_in_priority_order() {
    let lidl = SelectorStrategy::new(Source::Lidl, rules_for(Source::Lidl).unwrap());
    let request = lidl.page_request("milk", Duration::from_secs(15));
    assert_eq!(
        request.fields[NAME].candidates,
        [".product-title", ".product-grid-box__title"]
    );
    assert_eq!(request.fields[PRICE].candidates[0], ".price-tag");
}
