pub mod event_repo;
pub mod migrations;
pub mod news_repo;
pub mod position_repo;

use crate::domain::error::DomainError;
use chrono::{DateTime, Utc};
use migrations::run_migrations;
use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard};

/// One connection shared by every repository. Statements are serialized by
/// the mutex, so each write is atomic with respect to the others.
pub type SharedConnection = Arc<Mutex<Connection>>;

/// Opens (or creates) the store at `path` and applies migrations.
/// `":memory:"` gives a private in-memory database.
pub fn open_database(path: &str) -> Result<SharedConnection, DomainError> {
    let conn = Connection::open(path).map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
    if path != ":memory:" {
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| DomainError::Database(format!("WAL error: {e}")))?;
    }
    run_migrations(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

pub(crate) fn lock(conn: &SharedConnection) -> Result<MutexGuard<'_, Connection>, DomainError> {
    conn.lock().map_err(|e| DomainError::Database(e.to_string()))
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
