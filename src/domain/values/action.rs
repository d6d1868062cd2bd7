use crate::domain::values::trade_direction::TradeDirection;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Long,
    Short,
    Watch,
    Ignore,
    Error,
}

impl Action {
    /// Direction of the position this action opens, if any.
    pub fn direction(&self) -> Option<TradeDirection> {
        match self {
            Action::Long => Some(TradeDirection::Long),
            Action::Short => Some(TradeDirection::Short),
            Action::Watch | Action::Ignore | Action::Error => None,
        }
    }

    pub fn is_actionable(&self) -> bool {
        self.direction().is_some()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Long => write!(f, "LONG"),
            Action::Short => write!(f, "SHORT"),
            Action::Watch => write!(f, "WATCH"),
            Action::Ignore => write!(f, "IGNORE"),
            Action::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for Action {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LONG" => Ok(Action::Long),
            "SHORT" => Ok(Action::Short),
            "WATCH" => Ok(Action::Watch),
            "IGNORE" => Ok(Action::Ignore),
            "ERROR" => Ok(Action::Error),
            _ => Err(format!("Unknown action: {s}")),
        }
    }
}
