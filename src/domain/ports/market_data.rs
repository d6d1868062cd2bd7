use crate::domain::error::CollaboratorError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A symbol the market-data provider recognises as currently quoted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub name: Option<String>,
    pub currency: Option<String>,
    pub exchange: Option<String>,
}

/// Quote lookups. Each price method is one tier of the snapshot lookup in
/// `application::pricing`; `Ok(None)` means the tier had no usable data.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Existence check. `Ok(None)` when the symbol is unknown or delisted.
    async fn resolve(&self, ticker: &str) -> Result<Option<Instrument>, CollaboratorError>;

    /// Last close of the current session at one-minute granularity.
    async fn intraday_price(&self, ticker: &str) -> Result<Option<f64>, CollaboratorError>;

    /// Price field of the quote summary (regular market or current price).
    async fn quote_field_price(&self, ticker: &str) -> Result<Option<f64>, CollaboratorError>;

    /// Last close over the past few sessions.
    async fn recent_close(&self, ticker: &str) -> Result<Option<f64>, CollaboratorError>;
}
