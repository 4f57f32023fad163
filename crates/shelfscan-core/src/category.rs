//! Keyword-based product categorization.

/// Category keyword table, checked in order; the first category with a
/// matching word wins.
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("Dairy", &["milk", "cheese", "yogurt"]),
    ("Bakery", &["bread", "cake", "biscuit"]),
    ("Meat", &["chicken", "beef", "pork"]),
    ("Fruit", &["apple", "banana", "orange"]),
    ("Vegetables", &["potato", "carrot", "tomato"]),
    ("Beverages", &["coffee", "tea", "juice"]),
];

/// Returns the category for a product name, or `None` when no keyword matches.
///
/// Matching is on whole words, case-insensitive, with simple plurals
/// (`"apples"`, `"potatoes"`) accepted.
#[must_use]
pub fn categorize(name: &str) -> Option<&'static str> {
    let words: Vec<String> = name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();

    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| {
            words
                .iter()
                .any(|word| keywords.iter().any(|kw| word_matches(word, kw)))
        })
        .map(|(category, _)| *category)
}

fn word_matches(word: &str, keyword: &str) -> bool {
    word == keyword
        || word.strip_suffix('s') == Some(keyword)
        || word.strip_suffix("es") == Some(keyword)
}
