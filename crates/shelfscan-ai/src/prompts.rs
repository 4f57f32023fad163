//! Prompt contracts. The instruction text fixes the response shape each
//! extractor operation parses, so changing one means changing its parser.

use shelfscan_core::Source;

use crate::completion::Prompt;

const EXTRACTION_INSTRUCTION: &str = "You are a product data extraction specialist. \
Extract every product offer from the raw retailer page text you are given. \
Return a JSON array where each element has the fields \
name, price, unit, brand, category, inStock, description. \
price is the shelf price as a plain decimal number without currency symbols. \
Return only valid JSON, no explanations.";

const NORMALIZE_INSTRUCTION: &str = "Normalize this product name to a standard format. \
Remove retailer-specific branding but keep the actual brand name, size, and type. \
Return only the normalized name, nothing else.";

const BRAND_INSTRUCTION: &str = "Extract only the brand name from this product. \
Return only the brand name, nothing else. If no brand is found, return 'Unknown'.";

const CONFIDENCE_INSTRUCTION: &str = "Compare these two products and rate how similar \
they are on a scale of 0.0 to 1.0. \
Return only a decimal number between 0.0 and 1.0, nothing else.";

/// Expected response: a JSON array of product records.
#[must_use]
pub fn extraction(raw_text: &str, source: Source) -> Prompt {
    Prompt {
        instruction: EXTRACTION_INSTRUCTION.to_string(),
        payload: format!(
            "Retailer: {}\nRaw Data:\n{raw_text}",
            source.display_name()
        ),
    }
}

/// Expected response: the normalized name as bare text.
#[must_use]
pub fn normalize_name(name: &str) -> Prompt {
    Prompt {
        instruction: NORMALIZE_INSTRUCTION.to_string(),
        payload: format!("Product: '{name}'"),
    }
}

/// Expected response: the brand as bare text, or `Unknown`.
#[must_use]
pub fn brand(name: &str) -> Prompt {
    Prompt {
        instruction: BRAND_INSTRUCTION.to_string(),
        payload: format!("Product: '{name}'"),
    }
}

/// Expected response: a bare decimal in `[0, 1]`.
#[must_use]
pub fn confidence(name_a: &str, name_b: &str) -> Prompt {
    Prompt {
        instruction: CONFIDENCE_INSTRUCTION.to_string(),
        payload: format!("Product 1: '{name_a}'\nProduct 2: '{name_b}'"),
    }
}
