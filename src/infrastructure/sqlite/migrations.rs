use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS news_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            link TEXT NOT NULL UNIQUE,
            source TEXT NOT NULL,
            title TEXT NOT NULL,
            summary TEXT NOT NULL DEFAULT '',
            published_at TEXT NOT NULL,
            discovered_at TEXT NOT NULL,
            fingerprint TEXT NOT NULL DEFAULT '',
            action TEXT,
            decision_json TEXT,
            analyzed_at TEXT
        );

        CREATE TABLE IF NOT EXISTS positions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source_link TEXT NOT NULL,
            ticker TEXT NOT NULL,
            direction TEXT NOT NULL,
            entry_at TEXT NOT NULL,
            entry_price REAL NOT NULL,
            status TEXT NOT NULL DEFAULT 'OPEN',
            exit_at TEXT,
            exit_price REAL,
            pnl_pct REAL,
            UNIQUE(source_link, ticker)
        );

        CREATE TABLE IF NOT EXISTS news_events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ticker TEXT NOT NULL,
            headline TEXT NOT NULL,
            link TEXT NOT NULL,
            detected_at TEXT NOT NULL,
            processed INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_news_analyzed ON news_items(analyzed_at);
        CREATE INDEX IF NOT EXISTS idx_positions_status ON positions(status);
        CREATE INDEX IF NOT EXISTS idx_events_ticker ON news_events(ticker, processed);
        "
    ).map_err(|e| format!("Migration failed: {e}"))
}
