use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS timings_cache (
            date        TEXT PRIMARY KEY,
            source      TEXT NOT NULL CHECK(source IN ('aladhan','offline')),
            payload     TEXT NOT NULL,
            fetched_at  TEXT DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS reminders (
            id     INTEGER PRIMARY KEY AUTOINCREMENT,
            title  TEXT NOT NULL,
            body   TEXT NOT NULL DEFAULT '',
            time   TEXT NOT NULL,
            UNIQUE(title, time)
        );

        CREATE TABLE IF NOT EXISTS app_meta (
            key   TEXT PRIMARY KEY,
            value TEXT
        );
    ")?;
    Ok(())
}
