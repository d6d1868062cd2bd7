use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

static TICKER_RE: OnceLock<Regex> = OnceLock::new();

fn ticker_re() -> &'static Regex {
    TICKER_RE.get_or_init(|| Regex::new(r"\b[A-Z]{2,5}\b").expect("ticker pattern is valid"))
}

/// Ticker-like tokens (2 to 5 uppercase letters on word boundaries) in order
/// of first appearance, without duplicates. Common uppercase words are kept;
/// the lifecycle manager only consumes events for tickers it holds.
pub fn scan_tickers(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    ticker_re()
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|t| seen.insert(*t))
        .map(str::to_string)
        .collect()
}
