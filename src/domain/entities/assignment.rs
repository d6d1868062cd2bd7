use crate::domain::values::agent_kind::AgentKind;
use serde::{Deserialize, Serialize};

/// One unit of work for a specialized analysis collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentAssignment {
    pub kind: AgentKind,
    pub focus: String,
    /// Set for equity assignments.
    pub ticker: Option<String>,
}

impl AgentAssignment {
    pub fn equity(ticker: &str, company: &str) -> Self {
        Self {
            kind: AgentKind::Equity,
            focus: format!("{ticker} ({company})"),
            ticker: Some(ticker.to_string()),
        }
    }

    pub fn sector(focus: String) -> Self {
        Self {
            kind: AgentKind::Sector,
            focus,
            ticker: None,
        }
    }

    pub fn macro_view(focus: String) -> Self {
        Self {
            kind: AgentKind::Macro,
            focus,
            ticker: None,
        }
    }
}
