use crate::application::pricing::snapshot_price;
use crate::application::timeout::bounded;
use crate::domain::entities::position::Position;
use crate::domain::ports::market_data::MarketData;
use crate::domain::ports::news_event_repository::NewsEventRepository;
use crate::domain::ports::notifier::{ExitStrategist, Notifier};
use crate::domain::ports::position_repository::{PositionClose, PositionRepository};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LifecycleSettings {
    pub holding_period: chrono::Duration,
    pub interval: Duration,
    pub call_timeout: Duration,
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            holding_period: chrono::Duration::days(7),
            interval: Duration::from_secs(60),
            call_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct LifecycleReport {
    pub checked: usize,
    pub closed: Vec<ClosedPosition>,
    pub still_open: Vec<OpenPosition>,
    pub events_forwarded: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ClosedPosition {
    pub id: i64,
    pub ticker: String,
    pub direction: String,
    pub entry_price: f64,
    pub exit_price: f64,
    pub pnl_pct: f64,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct OpenPosition {
    pub id: i64,
    pub ticker: String,
    pub direction: String,
    pub entry_price: f64,
    pub age_hours: Option<f64>,
}

/// Age of a position in hours, rounded to 1 decimal.
fn age_hours(position: &Position, now: DateTime<Utc>) -> Option<f64> {
    position.age(now).map(|age| {
        let hours = age.num_seconds() as f64 / 3600.0;
        (hours * 10.0).round() / 10.0
    })
}

pub struct LifecycleManager {
    position_repo: Arc<dyn PositionRepository>,
    event_repo: Arc<dyn NewsEventRepository>,
    market: Arc<dyn MarketData>,
    notifier: Arc<dyn Notifier>,
    exit_strategist: Arc<dyn ExitStrategist>,
    settings: LifecycleSettings,
}

impl LifecycleManager {
    pub fn new(
        position_repo: Arc<dyn PositionRepository>,
        event_repo: Arc<dyn NewsEventRepository>,
        market: Arc<dyn MarketData>,
        notifier: Arc<dyn Notifier>,
        exit_strategist: Arc<dyn ExitStrategist>,
        settings: LifecycleSettings,
    ) -> Self {
        Self {
            position_repo,
            event_repo,
            market,
            notifier,
            exit_strategist,
            settings,
        }
    }

    /// Runs a cycle every `interval` until cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(
            holding_days = self.settings.holding_period.num_days(),
            interval_secs = self.settings.interval.as_secs(),
            "lifecycle manager started"
        );
        loop {
            let report = self.run_cycle(Utc::now()).await;
            if !report.closed.is_empty() || !report.errors.is_empty() {
                tracing::info!(
                    checked = report.checked,
                    closed = report.closed.len(),
                    errors = report.errors.len(),
                    "lifecycle cycle"
                );
            }
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.settings.interval) => {}
            }
        }
        tracing::debug!("lifecycle manager stopped");
    }

    /// Closes expired positions and forwards queued news for the others.
    pub async fn run_cycle(&self, now: DateTime<Utc>) -> LifecycleReport {
        let mut report = LifecycleReport::default();
        let open = match self.position_repo.list_open() {
            Ok(open) => open,
            Err(e) => {
                tracing::error!(error = %e, "failed to list open positions");
                report.errors.push(format!("Failed to list open positions: {e}"));
                return report;
            }
        };
        report.checked = open.len();

        for position in open {
            if position.is_expired(now, self.settings.holding_period) {
                self.close(&position, now, &mut report).await;
            } else {
                self.forward_news(&position, &mut report);
                report.still_open.push(OpenPosition {
                    id: position.id,
                    ticker: position.ticker.clone(),
                    direction: position.direction.to_string(),
                    entry_price: position.entry_price,
                    age_hours: age_hours(&position, now),
                });
            }
        }
        report
    }

    async fn close(&self, position: &Position, now: DateTime<Utc>, report: &mut LifecycleReport) {
        let reason = if position.entry_at.is_none() {
            "unreadable entry time"
        } else {
            "holding period elapsed"
        };
        let exit_price =
            snapshot_price(self.market.as_ref(), &position.ticker, self.settings.call_timeout).await;
        let pnl_pct = position.direction.pnl_pct(position.entry_price, exit_price);

        let closed = self.position_repo.close(
            position.id,
            &PositionClose {
                exit_at: now,
                exit_price,
                pnl_pct,
            },
        );
        match closed {
            Ok(true) => {
                tracing::info!(id = position.id, ticker = %position.ticker, pnl_pct, reason, "position closed");
                let message = format!(
                    "Position closed: {} {} entry {:.2} exit {:.2} P&L {:+.2}% ({reason})",
                    position.direction, position.ticker, position.entry_price, exit_price, pnl_pct
                );
                if let Err(e) = bounded(self.settings.call_timeout, self.notifier.notify(&message)).await {
                    tracing::warn!(id = position.id, error = %e, "close notification failed");
                }
                report.closed.push(ClosedPosition {
                    id: position.id,
                    ticker: position.ticker.clone(),
                    direction: position.direction.to_string(),
                    entry_price: position.entry_price,
                    exit_price,
                    pnl_pct,
                    reason: reason.to_string(),
                });
            }
            Ok(false) => {
                tracing::debug!(id = position.id, "position already closed elsewhere");
            }
            Err(e) => {
                tracing::error!(id = position.id, error = %e, "failed to close position");
                report.errors.push(format!("Failed to close position {}: {e}", position.id));
            }
        }
    }

    /// Hands unprocessed headlines to the exit strategist without waiting.
    fn forward_news(&self, position: &Position, report: &mut LifecycleReport) {
        let events = match self.event_repo.take_unprocessed(&position.ticker) {
            Ok(events) => events,
            Err(e) => {
                report.errors.push(format!("Failed to read events for {}: {e}", position.ticker));
                return;
            }
        };
        if events.is_empty() {
            return;
        }
        report.events_forwarded += events.len();

        let headlines: Vec<String> = events.into_iter().map(|e| e.headline).collect();
        let ticker = position.ticker.clone();
        let strategist = self.exit_strategist.clone();
        let limit = self.settings.call_timeout;
        tracing::info!(ticker = %ticker, count = headlines.len(), "forwarding news for open position");
        tokio::spawn(async move {
            if let Err(e) = bounded(limit, strategist.on_news(&ticker, &headlines)).await {
                tracing::warn!(ticker = %ticker, error = %e, "exit strategist failed");
            }
        });
    }
}
