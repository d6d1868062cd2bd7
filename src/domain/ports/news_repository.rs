use crate::domain::entities::decision::Decision;
use crate::domain::entities::news_item::NewsItem;
use crate::domain::error::DomainError;

/// A stored news item together with its decision, once one was made.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoredNews {
    pub item: NewsItem,
    pub decision: Option<Decision>,
}

pub trait NewsRepository: Send + Sync {
    fn exists(&self, link: &str) -> Result<bool, DomainError>;

    /// Returns false when an item with the same link is already stored.
    fn insert_if_absent(&self, item: &NewsItem) -> Result<bool, DomainError>;

    /// Writes the decision for `link` unless one is already stored.
    /// Returns false when nothing was written.
    fn save_decision(&self, link: &str, decision: &Decision) -> Result<bool, DomainError>;

    /// Removes the stored decision so the item is pending again.
    fn clear_decision(&self, link: &str) -> Result<(), DomainError>;

    fn get(&self, link: &str) -> Result<Option<StoredNews>, DomainError>;

    /// Most recent decisions first.
    fn list_decisions(&self, limit: usize) -> Result<Vec<StoredNews>, DomainError>;

    /// Items with no decision yet, oldest first.
    fn pending(&self, limit: usize) -> Result<Vec<NewsItem>, DomainError>;
}
