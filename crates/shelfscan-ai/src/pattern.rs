//! Regex fallback that pulls name/price pairs straight out of page text.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"£(\d+\.\d{2})|\b(\d+)p\b").expect("valid regex"));

const MIN_LINE_CHARS: usize = 10;
const MAX_LINE_CHARS: usize = 200;
const MAX_NAME_CHARS: usize = 100;
const MIN_NAME_CHARS: usize = 5;

/// Returns `(name, price)` for every line that looks like a priced product.
///
/// A line qualifies when it is strictly between 10 and 200 characters and
/// contains a `£N.NN` or `NNp` price. The name is the rest of the line with
/// prices removed, capped at 100 characters, and must be longer than 5.
pub(crate) fn extract_priced_lines(raw_text: &str) -> Vec<(String, Decimal)> {
    raw_text
        .lines()
        .map(str::trim)
        .filter(|line| {
            let len = line.chars().count();
            len > MIN_LINE_CHARS && len < MAX_LINE_CHARS
        })
        .filter_map(|line| {
            let price = first_price(line)?;
            let stripped = PRICE_RE.replace_all(line, " ");
            let name: String = stripped
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .chars()
                .take(MAX_NAME_CHARS)
                .collect();
            (name.chars().count() > MIN_NAME_CHARS).then_some((name, price))
        })
        .collect()
}

fn first_price(line: &str) -> Option<Decimal> {
    let caps = PRICE_RE.captures(line)?;
    if let Some(pounds) = caps.get(1) {
        return Decimal::from_str(pounds.as_str()).ok();
    }
    let pence = Decimal::from_str(caps.get(2)?.as_str()).ok()?;
    Some(pence / Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn extracts_pound_prices() {
        let found = extract_priced_lines("Whole Milk 2 Pints £1.45\nnav menu\n");
        assert_eq!(found, vec![("Whole Milk 2 Pints".to_string(), dec("1.45"))]);
    }

    #[test]
    fn converts_pence_to_pounds() {
        let found = extract_priced_lines("Value White Bread 800g 75p");
        assert_eq!(found, vec![("Value White Bread 800g".to_string(), dec("0.75"))]);
        let found = extract_priced_lines("Large Free Range Eggs 150p");
        assert_eq!(found[0].1, dec("1.50"));
    }

    #[test]
    fn skips_short_and_long_lines() {
        assert!(extract_priced_lines("Tea £1.00").is_empty());
        let long = format!("{} £1.00", "x".repeat(250));
        assert!(extract_priced_lines(&long).is_empty());
    }

    #[test]
    fn skips_lines_without_price() {
        assert!(extract_priced_lines("Sign in to see Clubcard prices").is_empty());
    }

    #[test]
    fn rejects_names_that_are_too_short() {
        assert!(extract_priced_lines("Buy   £1.00   £2.00").is_empty());
    }

    #[test]
    fn pint_sizes_are_not_mistaken_for_pence() {
        let found = extract_priced_lines("Semi Skimmed Milk 4 pints £1.65");
        assert_eq!(found[0].1, dec("1.65"));
        assert_eq!(found[0].0, "Semi Skimmed Milk 4 pints");
    }

    #[test]
    fn truncates_long_names() {
        let line = format!("{} £3.00", "Organic ".repeat(20).trim());
        let found = extract_priced_lines(&line);
        assert_eq!(found[0].0.chars().count(), 100);
    }
}
