use super::{lock, parse_timestamp, SharedConnection};
use crate::domain::entities::news_event::NewsEvent;
use crate::domain::error::DomainError;
use crate::domain::ports::news_event_repository::NewsEventRepository;
use chrono::Utc;
use rusqlite::params;

pub struct SqliteNewsEventRepo {
    conn: SharedConnection,
}

impl SqliteNewsEventRepo {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn row_to_event(row: &rusqlite::Row) -> Result<NewsEvent, rusqlite::Error> {
        let detected_str: String = row.get(4)?;
        let processed: i64 = row.get(5)?;
        Ok(NewsEvent {
            id: Some(row.get(0)?),
            ticker: row.get(1)?,
            headline: row.get(2)?,
            link: row.get(3)?,
            detected_at: parse_timestamp(&detected_str).unwrap_or_else(Utc::now),
            processed: processed != 0,
        })
    }
}

impl NewsEventRepository for SqliteNewsEventRepo {
    fn record(&self, event: &NewsEvent) -> Result<i64, DomainError> {
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO news_events (ticker, headline, link, detected_at, processed)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                event.ticker,
                event.headline,
                event.link,
                event.detected_at.to_rfc3339(),
                event.processed as i64,
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to record news event: {e}")))?;
        Ok(conn.last_insert_rowid())
    }

    fn take_unprocessed(&self, ticker: &str) -> Result<Vec<NewsEvent>, DomainError> {
        let conn = lock(&self.conn)?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| DomainError::Database(e.to_string()))?;

        let events: Vec<NewsEvent> = {
            let mut stmt = tx
                .prepare(
                    "SELECT id, ticker, headline, link, detected_at, processed FROM news_events
                     WHERE ticker = ?1 AND processed = 0 ORDER BY id ASC",
                )
                .map_err(|e| DomainError::Database(e.to_string()))?;
            let rows = stmt
                .query_map(params![ticker], Self::row_to_event)
                .map_err(|e| DomainError::Database(e.to_string()))?
                .filter_map(|r| r.ok())
                .collect();
            rows
        };

        if let Some(last_id) = events.iter().filter_map(|e| e.id).max() {
            tx.execute(
                "UPDATE news_events SET processed = 1
                 WHERE ticker = ?1 AND processed = 0 AND id <= ?2",
                params![ticker, last_id],
            )
            .map_err(|e| DomainError::Database(format!("Failed to mark events processed: {e}")))?;
        }
        tx.commit()
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(events
            .into_iter()
            .map(|e| NewsEvent {
                processed: true,
                ..e
            })
            .collect())
    }
}
