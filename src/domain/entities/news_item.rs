use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One discovered article, deduplicated by `link`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub source: String,
    pub title: String,
    pub link: String,
    /// Feed-provided summary; empty when the feed carries none.
    pub summary: String,
    pub published_at: DateTime<Utc>,
    pub discovered_at: DateTime<Utc>,
    /// Fingerprint of the feed payload the item was discovered in.
    pub fingerprint: String,
}

impl NewsItem {
    pub fn new(
        source: String,
        title: String,
        link: String,
        summary: String,
        published_at: DateTime<Utc>,
        fingerprint: String,
    ) -> Self {
        Self {
            source,
            title,
            link,
            summary,
            published_at,
            discovered_at: Utc::now(),
            fingerprint,
        }
    }

    /// Item for a link submitted by hand rather than discovered in a feed.
    pub fn manual(link: String, title: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            source: "manual".to_string(),
            title: title.unwrap_or_else(|| link.clone()),
            link,
            summary: String::new(),
            published_at: now,
            discovered_at: now,
            fingerprint: String::new(),
        }
    }

    /// Text scanned for ticker-like tokens.
    pub fn scannable_text(&self) -> String {
        if self.summary.is_empty() {
            self.title.clone()
        } else {
            format!("{} {}", self.title, self.summary)
        }
    }
}
