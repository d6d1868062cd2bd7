use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Validators from the previous successful fetch, sent back as
/// `If-None-Match` / `If-Modified-Since`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheValidators {
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchResponse {
    /// HTTP 304: nothing changed since the validators were issued.
    NotModified,
    Body {
        body: Vec<u8>,
        etag: Option<String>,
        last_modified: Option<String>,
    },
}

/// One entry of a parsed feed document.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub summary: String,
    /// `None` when the feed carries no usable date.
    pub published_at: Option<DateTime<Utc>>,
}

/// A syndication endpoint: conditional download plus document parsing.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(
        &self,
        url: &str,
        validators: &CacheValidators,
    ) -> Result<FetchResponse, FeedError>;

    fn parse(&self, body: &[u8]) -> Result<Vec<FeedEntry>, FeedError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedError {
    /// HTTP or network error
    Network(String),
    /// Non-success status other than 304
    Status(u16),
    /// Document parsing error
    Parse(String),
    /// Configuration error (bad URL, etc.)
    Config(String),
}

impl std::fmt::Display for FeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedError::Network(msg) => write!(f, "Network error: {msg}"),
            FeedError::Status(code) => write!(f, "HTTP status {code}"),
            FeedError::Parse(msg) => write!(f, "Parse error: {msg}"),
            FeedError::Config(msg) => write!(f, "Config error: {msg}"),
        }
    }
}

impl std::error::Error for FeedError {}
