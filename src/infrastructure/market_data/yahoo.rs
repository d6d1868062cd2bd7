use crate::domain::error::CollaboratorError;
use crate::domain::ports::market_data::{Instrument, MarketData};
use async_trait::async_trait;
use reqwest::StatusCode;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Yahoo Finance quotes via the v8 chart API (no auth required).
pub struct YahooMarketData {
    base_url: String,
    client: reqwest::Client,
}

impl YahooMarketData {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            client: reqwest::Client::builder()
                .user_agent(
                    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                     AppleWebKit/537.36 (KHTML, like Gecko) \
                     Chrome/120.0.0.0 Safari/537.36",
                )
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, serde::Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, serde::Deserialize)]
struct ChartData {
    meta: ChartMeta,
    #[serde(default)]
    indicators: Option<Indicators>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: String,
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    long_name: Option<String>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    exchange_name: Option<String>,
    #[serde(default)]
    regular_market_price: Option<f64>,
    #[serde(default)]
    chart_previous_close: Option<f64>,
}

#[derive(Debug, serde::Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, serde::Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

impl ChartData {
    fn last_close(&self) -> Option<f64> {
        self.indicators
            .as_ref()?
            .quote
            .first()?
            .close
            .iter()
            .rev()
            .flatten()
            .copied()
            .find(|p| is_usable(*p))
    }
}

fn is_usable(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

impl YahooMarketData {
    /// `Ok(None)` when Yahoo does not know the symbol.
    async fn chart(
        &self,
        ticker: &str,
        range: &str,
        interval: &str,
    ) -> Result<Option<ChartData>, CollaboratorError> {
        let symbol = ticker.trim().trim_start_matches('$');
        let url = format!(
            "{}/v8/finance/chart/{symbol}?range={range}&interval={interval}",
            self.base_url
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CollaboratorError::Network(e.to_string()))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(CollaboratorError::Network(format!(
                "Yahoo API returned {} for {symbol}",
                resp.status()
            )));
        }

        let data: ChartResponse = resp
            .json()
            .await
            .map_err(|e| CollaboratorError::Malformed(e.to_string()))?;

        if let Some(err) = data.chart.error.filter(|e| !e.is_null()) {
            tracing::debug!(ticker = %symbol, error = %err, "yahoo chart error");
            return Ok(None);
        }

        Ok(data.chart.result.and_then(|r| r.into_iter().next()))
    }
}

#[async_trait]
impl MarketData for YahooMarketData {
    async fn resolve(&self, ticker: &str) -> Result<Option<Instrument>, CollaboratorError> {
        let Some(data) = self.chart(ticker, "1d", "1d").await? else {
            return Ok(None);
        };
        let meta = data.meta;
        let quoted = meta.regular_market_price.is_some_and(is_usable)
            || meta.chart_previous_close.is_some_and(is_usable);
        if !quoted {
            return Ok(None);
        }
        Ok(Some(Instrument {
            symbol: meta.symbol,
            name: meta.short_name.or(meta.long_name),
            currency: meta.currency,
            exchange: meta.exchange_name,
        }))
    }

    async fn intraday_price(&self, ticker: &str) -> Result<Option<f64>, CollaboratorError> {
        Ok(self
            .chart(ticker, "1d", "1m")
            .await?
            .and_then(|d| d.last_close()))
    }

    async fn quote_field_price(&self, ticker: &str) -> Result<Option<f64>, CollaboratorError> {
        Ok(self
            .chart(ticker, "1d", "1d")
            .await?
            .and_then(|d| d.meta.regular_market_price)
            .filter(|p| is_usable(*p)))
    }

    async fn recent_close(&self, ticker: &str) -> Result<Option<f64>, CollaboratorError> {
        Ok(self
            .chart(ticker, "5d", "1d")
            .await?
            .and_then(|d| d.last_close()))
    }
}
