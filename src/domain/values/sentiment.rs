use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive => write!(f, "positive"),
            Self::Negative => write!(f, "negative"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" | "bullish" | "positif" => Ok(Self::Positive),
            "negative" | "bearish" | "négatif" | "negatif" => Ok(Self::Negative),
            "neutral" | "neutre" | "mixed" => Ok(Self::Neutral),
            _ => Err(format!(
                "Invalid sentiment: '{}'. Use 'positive', 'negative' or 'neutral'",
                s
            )),
        }
    }
}
