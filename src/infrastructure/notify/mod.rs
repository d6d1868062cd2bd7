use crate::domain::error::CollaboratorError;
use crate::domain::ports::notifier::{ExitStrategist, Notifier};
use async_trait::async_trait;

/// Writes notifications to the log instead of an outbound channel.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, message: &str) -> Result<(), CollaboratorError> {
        tracing::info!(target: "signaldesk::notify", "{message}");
        Ok(())
    }
}

/// Records late news for open positions without acting on it.
pub struct LogExitStrategist;

#[async_trait]
impl ExitStrategist for LogExitStrategist {
    async fn on_news(&self, ticker: &str, headlines: &[String]) -> Result<(), CollaboratorError> {
        for headline in headlines {
            tracing::info!(ticker = %ticker, headline = %headline, "news for open position");
        }
        Ok(())
    }
}
