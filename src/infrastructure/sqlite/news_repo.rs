use super::{lock, parse_timestamp, SharedConnection};
use crate::domain::entities::decision::Decision;
use crate::domain::entities::news_item::NewsItem;
use crate::domain::error::DomainError;
use crate::domain::ports::news_repository::{NewsRepository, StoredNews};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

const NEWS_COLUMNS: &str =
    "source, title, link, summary, published_at, discovered_at, fingerprint, decision_json";

pub struct SqliteNewsRepo {
    conn: SharedConnection,
}

impl SqliteNewsRepo {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn row_to_item(row: &rusqlite::Row) -> Result<NewsItem, rusqlite::Error> {
        let published_str: String = row.get(4)?;
        let discovered_str: String = row.get(5)?;
        let discovered_at = parse_timestamp(&discovered_str).unwrap_or_else(Utc::now);
        Ok(NewsItem {
            source: row.get(0)?,
            title: row.get(1)?,
            link: row.get(2)?,
            summary: row.get(3)?,
            published_at: parse_timestamp(&published_str).unwrap_or(discovered_at),
            discovered_at,
            fingerprint: row.get(6)?,
        })
    }

    fn row_to_stored(row: &rusqlite::Row) -> Result<StoredNews, rusqlite::Error> {
        let item = Self::row_to_item(row)?;
        let decision_json: Option<String> = row.get(7)?;
        let decision = decision_json.and_then(|json| match serde_json::from_str(&json) {
            Ok(d) => Some(d),
            Err(e) => {
                tracing::warn!(link = %item.link, error = %e, "unreadable stored decision");
                None
            }
        });
        Ok(StoredNews { item, decision })
    }
}

impl NewsRepository for SqliteNewsRepo {
    fn exists(&self, link: &str) -> Result<bool, DomainError> {
        let conn = lock(&self.conn)?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM news_items WHERE link = ?1",
                params![link],
                |row| row.get(0),
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    fn insert_if_absent(&self, item: &NewsItem) -> Result<bool, DomainError> {
        let conn = lock(&self.conn)?;
        let rows = conn
            .execute(
                "INSERT OR IGNORE INTO news_items (source, title, link, summary, published_at, discovered_at, fingerprint)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    item.source,
                    item.title,
                    item.link,
                    item.summary,
                    item.published_at.to_rfc3339(),
                    item.discovered_at.to_rfc3339(),
                    item.fingerprint,
                ],
            )
            .map_err(|e| DomainError::Database(format!("Failed to insert news item: {e}")))?;
        Ok(rows > 0)
    }

    fn save_decision(&self, link: &str, decision: &Decision) -> Result<bool, DomainError> {
        let json = serde_json::to_string(decision)
            .map_err(|e| DomainError::Parse(format!("Failed to encode decision: {e}")))?;
        let conn = lock(&self.conn)?;
        let rows = conn
            .execute(
                "UPDATE news_items SET action = ?1, decision_json = ?2, analyzed_at = ?3
                 WHERE link = ?4 AND decision_json IS NULL",
                params![
                    decision.action.to_string(),
                    json,
                    decision.decided_at.to_rfc3339(),
                    link
                ],
            )
            .map_err(|e| DomainError::Database(format!("Failed to save decision: {e}")))?;
        Ok(rows > 0)
    }

    fn clear_decision(&self, link: &str) -> Result<(), DomainError> {
        let conn = lock(&self.conn)?;
        conn.execute(
            "UPDATE news_items SET action = NULL, decision_json = NULL, analyzed_at = NULL
             WHERE link = ?1",
            params![link],
        )
        .map_err(|e| DomainError::Database(format!("Failed to clear decision: {e}")))?;
        Ok(())
    }

    fn get(&self, link: &str) -> Result<Option<StoredNews>, DomainError> {
        let conn = lock(&self.conn)?;
        conn.query_row(
            &format!("SELECT {NEWS_COLUMNS} FROM news_items WHERE link = ?1"),
            params![link],
            Self::row_to_stored,
        )
        .optional()
        .map_err(|e| DomainError::Database(e.to_string()))
    }

    fn list_decisions(&self, limit: usize) -> Result<Vec<StoredNews>, DomainError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {NEWS_COLUMNS} FROM news_items WHERE decision_json IS NOT NULL
                 ORDER BY analyzed_at DESC LIMIT ?1"
            ))
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![limit as i64], Self::row_to_stored)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }

    fn pending(&self, limit: usize) -> Result<Vec<NewsItem>, DomainError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {NEWS_COLUMNS} FROM news_items WHERE decision_json IS NULL
                 ORDER BY discovered_at ASC LIMIT ?1"
            ))
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![limit as i64], Self::row_to_item)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::sqlite::open_database;

    fn item(link: &str) -> NewsItem {
        NewsItem::new(
            "test".into(),
            "Title".into(),
            link.into(),
            String::new(),
            Utc::now(),
            "abc".into(),
        )
    }

    #[test]
    fn test_insert_if_absent_is_idempotent() {
        let repo = SqliteNewsRepo::new(open_database(":memory:").unwrap());
        assert!(repo.insert_if_absent(&item("https://x/1")).unwrap());
        assert!(!repo.insert_if_absent(&item("https://x/1")).unwrap());
        assert!(repo.exists("https://x/1").unwrap());
        assert_eq!(repo.pending(10).unwrap().len(), 1);
    }

    #[test]
    fn test_decision_written_once() {
        let repo = SqliteNewsRepo::new(open_database(":memory:").unwrap());
        repo.insert_if_absent(&item("https://x/1")).unwrap();

        let first = Decision::error("first", vec![]);
        let second = Decision::error("second", vec![]);
        assert!(repo.save_decision("https://x/1", &first).unwrap());
        assert!(!repo.save_decision("https://x/1", &second).unwrap());

        let stored = repo.get("https://x/1").unwrap().unwrap();
        assert_eq!(stored.decision.unwrap().negatives, vec!["first".to_string()]);
        assert!(repo.pending(10).unwrap().is_empty());
        assert_eq!(repo.list_decisions(10).unwrap().len(), 1);
    }

    #[test]
    fn test_cleared_decision_is_pending_again() {
        let repo = SqliteNewsRepo::new(open_database(":memory:").unwrap());
        repo.insert_if_absent(&item("https://x/1")).unwrap();
        repo.save_decision("https://x/1", &Decision::error("first", vec![])).unwrap();

        repo.clear_decision("https://x/1").unwrap();
        assert!(repo.get("https://x/1").unwrap().unwrap().decision.is_none());
        assert_eq!(repo.pending(10).unwrap().len(), 1);
        assert!(repo.save_decision("https://x/1", &Decision::error("retry", vec![])).unwrap());
    }

    #[test]
    fn test_save_decision_for_unknown_link() {
        let repo = SqliteNewsRepo::new(open_database(":memory:").unwrap());
        assert!(!repo.save_decision("https://nowhere", &Decision::error("x", vec![])).unwrap());
        assert!(repo.get("https://nowhere").unwrap().is_none());
    }
}
