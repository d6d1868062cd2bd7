use crate::domain::error::CollaboratorError;
use async_trait::async_trait;

/// Outbound message sink. Best-effort: failures are logged, never retried.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> Result<(), CollaboratorError>;
}

/// Receives late news for an open position. Best-effort.
#[async_trait]
pub trait ExitStrategist: Send + Sync {
    async fn on_news(&self, ticker: &str, headlines: &[String]) -> Result<(), CollaboratorError>;
}
