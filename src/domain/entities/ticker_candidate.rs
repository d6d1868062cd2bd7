use serde::{Deserialize, Serialize};

/// A proposed instrument symbol. `validated` flips to true only after a
/// market-data lookup confirmed the symbol is currently quoted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerCandidate {
    pub symbol: String,
    pub company: String,
    pub rationale: String,
    #[serde(default)]
    pub validated: bool,
}

const CURRENCY_MARKERS: &[char] = &['$', '€', '£', '¥'];

impl TickerCandidate {
    pub fn new(symbol: String, company: String, rationale: String) -> Self {
        Self {
            symbol,
            company,
            rationale,
            validated: false,
        }
    }

    /// Normalize a raw symbol: trim whitespace and currency markers, uppercase.
    /// Returns `None` when nothing usable is left.
    pub fn normalize_symbol(raw: &str) -> Option<String> {
        let cleaned: String = raw
            .trim()
            .trim_matches(|c: char| c.is_whitespace() || CURRENCY_MARKERS.contains(&c))
            .to_uppercase();
        if cleaned.is_empty() || cleaned.chars().any(char::is_whitespace) {
            return None;
        }
        Some(cleaned)
    }
}
