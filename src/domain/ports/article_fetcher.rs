use crate::domain::error::CollaboratorError;
use async_trait::async_trait;

/// Retrieves the full text behind a news link.
#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    async fn fetch(&self, link: &str) -> Result<String, CollaboratorError>;
}
