use crate::domain::values::position_status::PositionStatus;
use crate::domain::values::trade_direction::TradeDirection;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A tracked LONG/SHORT exposure opened from a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: i64,
    /// Link of the news item whose decision opened the position.
    pub source_link: String,
    pub ticker: String,
    pub direction: TradeDirection,
    /// `None` when the stored timestamp could not be parsed.
    pub entry_at: Option<DateTime<Utc>>,
    pub entry_price: f64,
    pub status: PositionStatus,
    pub exit_at: Option<DateTime<Utc>>,
    pub exit_price: Option<f64>,
    pub pnl_pct: Option<f64>,
}

impl Position {
    pub fn age(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.entry_at.map(|entry| now - entry)
    }

    /// Past the holding period, or with an unknown entry time.
    pub fn is_expired(&self, now: DateTime<Utc>, holding_period: Duration) -> bool {
        match self.age(now) {
            Some(age) => age > holding_period,
            None => true,
        }
    }
}

/// Insert payload for a position. Unique per (source_link, ticker).
#[derive(Debug, Clone, PartialEq)]
pub struct NewPosition {
    pub source_link: String,
    pub ticker: String,
    pub direction: TradeDirection,
    pub entry_at: DateTime<Utc>,
    pub entry_price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(entry_at: Option<DateTime<Utc>>) -> Position {
        Position {
            id: 1,
            source_link: "https://example.com/a".into(),
            ticker: "AAPL".into(),
            direction: TradeDirection::Long,
            entry_at,
            entry_price: 100.0,
            status: PositionStatus::Open,
            exit_at: None,
            exit_price: None,
            pnl_pct: None,
        }
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let holding = Duration::days(7);
        assert!(!position(Some(now - Duration::days(7))).is_expired(now, holding));
        assert!(position(Some(now - Duration::days(7) - Duration::seconds(1))).is_expired(now, holding));
        assert!(!position(Some(now - Duration::days(1))).is_expired(now, holding));
    }

    #[test]
    fn test_unknown_entry_time_is_expired() {
        assert!(position(None).is_expired(Utc::now(), Duration::days(7)));
    }
}
