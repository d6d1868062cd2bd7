use crate::application::timeout::bounded;
use crate::domain::ports::market_data::MarketData;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Intraday,
    QuoteField,
    RecentClose,
}

const TIERS: [Tier; 3] = [Tier::Intraday, Tier::QuoteField, Tier::RecentClose];

/// Best available price for `ticker`, trying intraday, then the quote
/// field, then the recent daily close. Returns 0.0 when every tier fails.
pub async fn snapshot_price(market: &dyn MarketData, ticker: &str, limit: Duration) -> f64 {
    for tier in TIERS {
        let result = match tier {
            Tier::Intraday => bounded(limit, market.intraday_price(ticker)).await,
            Tier::QuoteField => bounded(limit, market.quote_field_price(ticker)).await,
            Tier::RecentClose => bounded(limit, market.recent_close(ticker)).await,
        };
        match result {
            Ok(Some(price)) if price.is_finite() && price > 0.0 => return price,
            Ok(_) => tracing::debug!(ticker = %ticker, tier = ?tier, "no price at tier"),
            Err(e) => tracing::debug!(ticker = %ticker, tier = ?tier, error = %e, "price tier failed"),
        }
    }
    tracing::warn!(ticker = %ticker, "no price available, using 0.0");
    0.0
}
