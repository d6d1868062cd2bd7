use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of specialized analysis unit an assignment is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    /// One listed instrument.
    Equity,
    /// Several instruments sharing an industry.
    Sector,
    /// No tradable instrument; economy-wide reading of the news.
    Macro,
}

impl AgentKind {
    pub fn label(&self) -> &'static str {
        match self {
            AgentKind::Equity => "EQUITY FOCUS",
            AgentKind::Sector => "SECTOR FOCUS",
            AgentKind::Macro => "MACRO FOCUS",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentKind::Equity => write!(f, "equity"),
            AgentKind::Sector => write!(f, "sector"),
            AgentKind::Macro => write!(f, "macro"),
        }
    }
}
