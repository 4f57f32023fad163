//! Tolerant field scan over a model's JSON-ish extraction response.
//!
//! Models often wrap the array in prose or code fences, drop quotes around
//! numbers, or truncate the tail. Rather than parsing strict JSON, the
//! response is split on `{` and each chunk is scanned for `"key": value`
//! pairs, so one malformed record does not discard the rest.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use shelfscan_core::normalize::parse_price;

static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""(\w+)"\s*:\s*(?:"((?:[^"\\]|\\.)*)"|([^,}\]\s]+))"#).expect("valid regex")
});

/// One product record recovered from a completion response.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExtractedRecord {
    pub name: String,
    pub price: Option<Decimal>,
    pub unit: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub in_stock: bool,
    pub description: Option<String>,
}

/// Scans `response` for records carrying at least a `name` and a `price` key.
pub(crate) fn parse_records(response: &str) -> Vec<ExtractedRecord> {
    response
        .split('{')
        .filter(|chunk| chunk.contains("\"name\"") && chunk.contains("\"price\""))
        .filter_map(parse_chunk)
        .collect()
}

fn parse_chunk(chunk: &str) -> Option<ExtractedRecord> {
    let mut fields: HashMap<String, String> = HashMap::new();
    for caps in FIELD_RE.captures_iter(chunk) {
        let key = caps[1].to_string();
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map(|m| m.as_str().replace("\\\"", "\"").trim().to_string())
            .unwrap_or_default();
        if value.is_empty() || value == "null" {
            continue;
        }
        fields.entry(key).or_insert(value);
    }

    let name = fields.remove("name")?;
    let price = fields.get("price").and_then(|p| parse_price(p));
    let in_stock = fields
        .get("inStock")
        .is_none_or(|v| !matches!(v.to_lowercase().as_str(), "false" | "no" | "0"));

    Some(ExtractedRecord {
        name,
        price,
        unit: fields.remove("unit"),
        brand: fields.remove("brand"),
        category: fields.remove("category"),
        in_stock,
        description: fields.remove("description"),
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn parses_well_formed_array() {
        let response = r#"[
            {"name": "Whole Milk 2 Pints", "price": "1.20", "unit": "2 pints", "brand": "Tesco", "category": "Dairy", "inStock": true, "description": "Fresh milk"},
            {"name": "Sourdough Bread 400g", "price": 2.10, "unit": null, "brand": null, "category": "Bakery", "inStock": false}
        ]"#;
        let records = parse_records(response);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Whole Milk 2 Pints");
        assert_eq!(records[0].price, Some(Decimal::from_str("1.20").unwrap()));
        assert_eq!(records[0].unit.as_deref(), Some("2 pints"));
        assert_eq!(records[0].description.as_deref(), Some("Fresh milk"));
        assert!(records[0].in_stock);
        assert_eq!(records[1].price, Some(Decimal::from_str("2.10").unwrap()));
        assert!(records[1].unit.is_none());
        assert!(records[1].brand.is_none());
        assert!(!records[1].in_stock);
    }

    #[test]
    fn tolerates_prose_fences_and_currency() {
        let response = "Sure! Here are the products:\n```json\n[{\"name\": \"Bagels 5 Pack\", \"price\": \"£1.35\"}]\n```";
        let records = parse_records(response);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].price, Some(Decimal::from_str("1.35").unwrap()));
        assert!(records[0].in_stock);
    }

    #[test]
    fn keeps_records_before_a_truncated_tail() {
        let response = r#"[{"name": "Cheddar 400g", "price": "2.50"}, {"name": "Butter 250g", "pri"#;
        let records = parse_records(response);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Cheddar 400g");
    }

    #[test]
    fn unparseable_price_is_none() {
        let records = parse_records(r#"[{"name": "Mystery Box", "price": "TBC"}]"#);
        assert_eq!(records.len(), 1);
        assert!(records[0].price.is_none());
    }

    #[test]
    fn non_json_response_yields_nothing() {
        assert!(parse_records("I could not find any products.").is_empty());
        assert!(parse_records("").is_empty());
    }

    #[test]
    fn handles_escaped_quotes_in_values() {
        let records = parse_records(r#"[{"name": "Goat's \"Finest\" Milk", "price": "1.99"}]"#);
        assert_eq!(records[0].name, "Goat's \"Finest\" Milk");
    }
}
