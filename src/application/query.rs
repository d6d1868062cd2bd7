use crate::domain::entities::news_item::NewsItem;
use crate::domain::entities::position::Position;
use crate::domain::error::DomainError;
use crate::domain::ports::news_repository::{NewsRepository, StoredNews};
use crate::domain::ports::position_repository::{PositionFilter, PositionRepository};
use crate::domain::values::position_status::PositionStatus;
use std::sync::Arc;

/// Read-only views over stored decisions and positions.
pub struct QueryUseCase {
    news_repo: Arc<dyn NewsRepository>,
    position_repo: Arc<dyn PositionRepository>,
}

impl QueryUseCase {
    pub fn new(news_repo: Arc<dyn NewsRepository>, position_repo: Arc<dyn PositionRepository>) -> Self {
        Self {
            news_repo,
            position_repo,
        }
    }

    pub fn positions(
        &self,
        status: Option<PositionStatus>,
        ticker: Option<String>,
        limit: Option<usize>,
    ) -> Result<Vec<Position>, DomainError> {
        self.position_repo.list(&PositionFilter {
            status,
            ticker,
            limit,
        })
    }

    pub fn decisions(&self, limit: usize) -> Result<Vec<StoredNews>, DomainError> {
        self.news_repo.list_decisions(limit)
    }

    pub fn news(&self, link: &str) -> Result<StoredNews, DomainError> {
        self.news_repo
            .get(link)?
            .ok_or_else(|| DomainError::NotFound(format!("News item not found: {link}")))
    }

    pub fn pending(&self, limit: usize) -> Result<Vec<NewsItem>, DomainError> {
        self.news_repo.pending(limit)
    }
}
