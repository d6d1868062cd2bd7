use serde::{Deserialize, Serialize};
use std::fmt;

/// Industry buckets used by deterministic routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sector {
    Technology,
    Automotive,
    Energy,
    Finance,
    Healthcare,
}

impl Sector {
    pub const ALL: [Sector; 5] = [
        Sector::Technology,
        Sector::Automotive,
        Sector::Energy,
        Sector::Finance,
        Sector::Healthcare,
    ];

    /// Keywords matched against lowercase rationale text. Single words match
    /// whole tokens only ("ai" must not match "said"); phrases match as substrings.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Sector::Technology => &[
                "tech",
                "technology",
                "ai",
                "artificial intelligence",
                "software",
                "semiconductor",
                "semiconductors",
                "chip",
                "chips",
                "cloud",
            ],
            Sector::Automotive => &["auto", "automotive", "vehicle", "vehicles", "ev", "car", "cars", "transport"],
            Sector::Energy => &["energy", "oil", "gas", "crude", "renewable", "utilities"],
            Sector::Finance => &["finance", "financial", "bank", "banks", "banking", "credit", "lending", "insurance"],
            Sector::Healthcare => &["health", "healthcare", "pharma", "pharmaceutical", "biotech", "drug"],
        }
    }

    /// First sector (in declaration order) whose keywords appear in `text`.
    pub fn infer(text: &str) -> Option<Sector> {
        let lower = text.to_lowercase();
        let tokens: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();

        Sector::ALL.into_iter().find(|sector| {
            sector.keywords().iter().any(|kw| {
                if kw.contains(' ') {
                    lower.contains(kw)
                } else {
                    tokens.iter().any(|t| t == kw)
                }
            })
        })
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sector::Technology => write!(f, "Technology"),
            Sector::Automotive => write!(f, "Automotive"),
            Sector::Energy => write!(f, "Energy"),
            Sector::Finance => write!(f, "Finance"),
            Sector::Healthcare => write!(f, "Healthcare"),
        }
    }
}
