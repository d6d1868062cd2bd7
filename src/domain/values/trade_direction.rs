use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeDirection {
    Long,
    Short,
}

impl TradeDirection {
    /// Realized P&L in percent of the entry price.
    ///
    /// Returns 0.0 when either price is unusable (zero, negative or non-finite),
    /// so a position can always be closed even without market data.
    pub fn pnl_pct(&self, entry_price: f64, exit_price: f64) -> f64 {
        if !entry_price.is_finite() || !exit_price.is_finite() {
            return 0.0;
        }
        if entry_price <= 0.0 || exit_price <= 0.0 {
            return 0.0;
        }
        match self {
            TradeDirection::Long => (exit_price - entry_price) / entry_price * 100.0,
            TradeDirection::Short => (entry_price - exit_price) / entry_price * 100.0,
        }
    }
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeDirection::Long => write!(f, "LONG"),
            TradeDirection::Short => write!(f, "SHORT"),
        }
    }
}

impl FromStr for TradeDirection {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LONG" => Ok(TradeDirection::Long),
            "SHORT" => Ok(TradeDirection::Short),
            _ => Err(format!("Unknown trade direction: {s}")),
        }
    }
}
