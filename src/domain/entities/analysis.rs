use crate::domain::values::sentiment::Sentiment;
use serde::{Deserialize, Serialize};

/// Output of the summarization/classification collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialAnalysis {
    pub summary: String,
    /// Ordinal market impact, 1 (negligible) to 10 (market moving).
    pub impact: u8,
    pub sentiment: Sentiment,
    /// Raw entity strings: tickers, company names, sector words.
    pub entities: Vec<String>,
}
