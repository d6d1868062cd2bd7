use crate::domain::entities::news_event::NewsEvent;
use crate::domain::error::DomainError;

pub trait NewsEventRepository: Send + Sync {
    fn record(&self, event: &NewsEvent) -> Result<i64, DomainError>;

    /// Returns the unprocessed events for `ticker` and marks them processed
    /// in the same operation, so no event is handed out twice.
    fn take_unprocessed(&self, ticker: &str) -> Result<Vec<NewsEvent>, DomainError>;
}
