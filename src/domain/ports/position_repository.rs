use crate::domain::entities::position::{NewPosition, Position};
use crate::domain::error::DomainError;
use crate::domain::values::position_status::PositionStatus;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default)]
pub struct PositionFilter {
    pub status: Option<PositionStatus>,
    pub ticker: Option<String>,
    pub limit: Option<usize>,
}

/// Exit data written when a position closes.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionClose {
    pub exit_at: DateTime<Utc>,
    pub exit_price: f64,
    pub pnl_pct: f64,
}

pub trait PositionRepository: Send + Sync {
    /// Returns the new id, or `None` when (source_link, ticker) already exists.
    fn open_if_absent(&self, position: &NewPosition) -> Result<Option<i64>, DomainError>;

    fn list_open(&self) -> Result<Vec<Position>, DomainError>;

    /// Closes the position only if it is still open. Returns true when this
    /// call performed the transition.
    fn close(&self, id: i64, close: &PositionClose) -> Result<bool, DomainError>;

    fn list(&self, filter: &PositionFilter) -> Result<Vec<Position>, DomainError>;
}
