use super::{lock, parse_timestamp, SharedConnection};
use crate::domain::entities::position::{NewPosition, Position};
use crate::domain::error::DomainError;
use crate::domain::ports::position_repository::*;
use crate::domain::values::position_status::PositionStatus;
use crate::domain::values::trade_direction::TradeDirection;
use rusqlite::params;

const POSITION_COLUMNS: &str =
    "id, source_link, ticker, direction, entry_at, entry_price, status, exit_at, exit_price, pnl_pct";

pub struct SqlitePositionRepo {
    conn: SharedConnection,
}

impl SqlitePositionRepo {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn row_to_position(row: &rusqlite::Row) -> Result<Position, rusqlite::Error> {
        let dir_str: String = row.get(3)?;
        let entry_str: String = row.get(4)?;
        let status_str: String = row.get(6)?;
        let exit_str: Option<String> = row.get(7)?;

        let direction = dir_str.parse::<TradeDirection>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, e.into())
        })?;
        let status = status_str.parse::<PositionStatus>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, e.into())
        })?;

        Ok(Position {
            id: row.get(0)?,
            source_link: row.get(1)?,
            ticker: row.get(2)?,
            direction,
            entry_at: parse_timestamp(&entry_str),
            entry_price: row.get(5)?,
            status,
            exit_at: exit_str.as_deref().and_then(parse_timestamp),
            exit_price: row.get(8)?,
            pnl_pct: row.get(9)?,
        })
    }
}

impl PositionRepository for SqlitePositionRepo {
    fn open_if_absent(&self, position: &NewPosition) -> Result<Option<i64>, DomainError> {
        let conn = lock(&self.conn)?;
        let rows = conn
            .execute(
                "INSERT OR IGNORE INTO positions (source_link, ticker, direction, entry_at, entry_price, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, 'OPEN')",
                params![
                    position.source_link,
                    position.ticker,
                    position.direction.to_string(),
                    position.entry_at.to_rfc3339(),
                    position.entry_price,
                ],
            )
            .map_err(|e| DomainError::Database(format!("Failed to open position: {e}")))?;
        if rows == 0 {
            return Ok(None);
        }
        Ok(Some(conn.last_insert_rowid()))
    }

    fn list_open(&self) -> Result<Vec<Position>, DomainError> {
        self.list(&PositionFilter {
            status: Some(PositionStatus::Open),
            ..Default::default()
        })
    }

    fn close(&self, id: i64, close: &PositionClose) -> Result<bool, DomainError> {
        let conn = lock(&self.conn)?;
        let rows = conn
            .execute(
                "UPDATE positions SET status = 'CLOSED', exit_at = ?1, exit_price = ?2, pnl_pct = ?3
                 WHERE id = ?4 AND status = 'OPEN'",
                params![close.exit_at.to_rfc3339(), close.exit_price, close.pnl_pct, id],
            )
            .map_err(|e| DomainError::Database(format!("Failed to close position: {e}")))?;
        Ok(rows > 0)
    }

    fn list(&self, filter: &PositionFilter) -> Result<Vec<Position>, DomainError> {
        let conn = lock(&self.conn)?;
        let mut sql = format!("SELECT {POSITION_COLUMNS} FROM positions WHERE 1=1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(status) = &filter.status {
            sql.push_str(&format!(" AND status = ?{}", param_values.len() + 1));
            param_values.push(Box::new(status.to_string()));
        }
        if let Some(ticker) = &filter.ticker {
            sql.push_str(&format!(" AND ticker = ?{}", param_values.len() + 1));
            param_values.push(Box::new(ticker.to_uppercase()));
        }
        sql.push_str(" ORDER BY id DESC");
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT ?{}", param_values.len() + 1));
            param_values.push(Box::new(limit as i64));
        }

        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let positions = stmt
            .query_map(params_refs.as_slice(), Self::row_to_position)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| match r {
                Ok(p) => Some(p),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable position row");
                    None
                }
            })
            .collect();
        Ok(positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::sqlite::open_database;
    use chrono::Utc;

    fn new_position(link: &str, ticker: &str) -> NewPosition {
        NewPosition {
            source_link: link.into(),
            ticker: ticker.into(),
            direction: TradeDirection::Long,
            entry_at: Utc::now(),
            entry_price: 100.0,
        }
    }

    fn close_at(price: f64) -> PositionClose {
        PositionClose {
            exit_at: Utc::now(),
            exit_price: price,
            pnl_pct: 10.0,
        }
    }

    #[test]
    fn test_open_if_absent_unique_per_link_and_ticker() {
        let repo = SqlitePositionRepo::new(open_database(":memory:").unwrap());
        assert!(repo.open_if_absent(&new_position("https://x/1", "AAPL")).unwrap().is_some());
        assert!(repo.open_if_absent(&new_position("https://x/1", "AAPL")).unwrap().is_none());
        assert!(repo.open_if_absent(&new_position("https://x/1", "MSFT")).unwrap().is_some());
        assert_eq!(repo.list_open().unwrap().len(), 2);
    }

    #[test]
    fn test_close_only_once() {
        let repo = SqlitePositionRepo::new(open_database(":memory:").unwrap());
        let id = repo.open_if_absent(&new_position("https://x/1", "AAPL")).unwrap().unwrap();
        assert!(repo.close(id, &close_at(110.0)).unwrap());
        assert!(!repo.close(id, &close_at(120.0)).unwrap());

        let closed = repo
            .list(&PositionFilter {
                status: Some(PositionStatus::Closed),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].exit_price, Some(110.0));
        assert!(repo.list_open().unwrap().is_empty());
    }

    #[test]
    fn test_unparseable_entry_time_reads_as_none() {
        let conn = open_database(":memory:").unwrap();
        conn.lock()
            .unwrap()
            .execute(
                "INSERT INTO positions (source_link, ticker, direction, entry_at, entry_price)
                 VALUES ('https://x/1', 'AAPL', 'LONG', 'not-a-date', 10.0)",
                [],
            )
            .unwrap();
        let repo = SqlitePositionRepo::new(conn);
        let open = repo.list_open().unwrap();
        assert_eq!(open.len(), 1);
        assert!(open[0].entry_at.is_none());
    }
}
