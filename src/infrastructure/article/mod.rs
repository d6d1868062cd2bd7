use crate::domain::error::CollaboratorError;
use crate::domain::ports::article_fetcher::ArticleFetcher;
use async_trait::async_trait;
use std::time::Duration;

/// Downloads the page behind a link and hands back its body as text,
/// truncated to `max_chars`. No markup extraction happens here.
pub struct HttpArticleFetcher {
    client: reqwest::Client,
    max_chars: usize,
}

impl HttpArticleFetcher {
    pub fn new(request_timeout: Duration, max_chars: usize) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(concat!("signaldesk/", env!("CARGO_PKG_VERSION")))
                .timeout(request_timeout)
                .build()
                .unwrap_or_default(),
            max_chars,
        }
    }
}

#[async_trait]
impl ArticleFetcher for HttpArticleFetcher {
    async fn fetch(&self, link: &str) -> Result<String, CollaboratorError> {
        let resp = self
            .client
            .get(link)
            .send()
            .await
            .map_err(|e| CollaboratorError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(CollaboratorError::Network(format!(
                "{link} returned {}",
                resp.status()
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| CollaboratorError::Malformed(e.to_string()))?;
        Ok(truncate_chars(body.trim(), self.max_chars))
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
