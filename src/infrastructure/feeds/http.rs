use crate::domain::ports::feed_source::{
    CacheValidators, FeedEntry, FeedError, FeedSource, FetchResponse,
};
use async_trait::async_trait;
use reqwest::header::{ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use reqwest::StatusCode;
use std::time::Duration;

/// RSS/Atom source over HTTP with conditional requests.
pub struct HttpFeedSource {
    client: reqwest::Client,
}

impl HttpFeedSource {
    pub fn new(request_timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(concat!("signaldesk/", env!("CARGO_PKG_VERSION")))
                .timeout(request_timeout)
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(
        &self,
        url: &str,
        validators: &CacheValidators,
    ) -> Result<FetchResponse, FeedError> {
        let mut request = self.client.get(url);
        if let Some(etag) = &validators.etag {
            request = request.header(IF_NONE_MATCH, etag);
        }
        if let Some(modified) = &validators.last_modified {
            request = request.header(IF_MODIFIED_SINCE, modified);
        }

        let resp = request.send().await.map_err(|e| {
            if e.is_builder() {
                FeedError::Config(e.to_string())
            } else {
                FeedError::Network(e.to_string())
            }
        })?;

        if resp.status() == StatusCode::NOT_MODIFIED {
            return Ok(FetchResponse::NotModified);
        }
        if !resp.status().is_success() {
            return Err(FeedError::Status(resp.status().as_u16()));
        }

        let header = |name: reqwest::header::HeaderName| {
            resp.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let etag = header(ETAG);
        let last_modified = header(LAST_MODIFIED);

        let body = resp
            .bytes()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;

        Ok(FetchResponse::Body {
            body: body.to_vec(),
            etag,
            last_modified,
        })
    }

    fn parse(&self, body: &[u8]) -> Result<Vec<FeedEntry>, FeedError> {
        parse_feed(body)
    }
}

/// Parses an RSS or Atom document. Entries without a link are skipped.
pub fn parse_feed(body: &[u8]) -> Result<Vec<FeedEntry>, FeedError> {
    let feed = feed_rs::parser::parse(body).map_err(|e| FeedError::Parse(e.to_string()))?;

    let entries = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let link = entry.links.first().map(|l| l.href.trim().to_string())?;
            if link.is_empty() {
                return None;
            }
            Some(FeedEntry {
                title: entry
                    .title
                    .map(|t| t.content.trim().to_string())
                    .unwrap_or_default(),
                link,
                summary: entry
                    .summary
                    .map(|t| t.content.trim().to_string())
                    .unwrap_or_default(),
                published_at: entry.published.or(entry.updated),
            })
        })
        .collect();
    Ok(entries)
}
