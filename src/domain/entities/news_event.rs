use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ticker-tagged headline queued for the lifecycle manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsEvent {
    /// Assigned by the store; `None` until recorded.
    pub id: Option<i64>,
    pub ticker: String,
    pub headline: String,
    pub link: String,
    pub detected_at: DateTime<Utc>,
    pub processed: bool,
}

impl NewsEvent {
    pub fn new(ticker: String, headline: String, link: String) -> Self {
        Self {
            id: None,
            ticker,
            headline,
            link,
            detected_at: Utc::now(),
            processed: false,
        }
    }
}
