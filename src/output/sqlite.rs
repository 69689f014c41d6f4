//! SQLite sink: append-only records table
//!
//! Records are stored as serialized JSON alongside a save timestamp, so
//! downstream tooling can query or export without knowing the record
//! schema.

use crate::output::{Sink, SinkError};
use rusqlite::{params, Connection};
use serde_json::Value;
use std::path::Path;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    saved_at TEXT NOT NULL,
    payload TEXT NOT NULL
);
";

pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Opens (or creates) the database and ensures the schema exists
    pub fn open(path: &Path) -> Result<Self, SinkError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Number of records in the table, for tests and reporting
    pub fn record_count(&self) -> Result<u64, SinkError> {
        let count: u64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl Sink for SqliteSink {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn save(&mut self, record: &Value) -> Result<(), SinkError> {
        let payload = serde_json::to_string(record)?;
        self.conn.execute(
            "INSERT INTO records (saved_at, payload) VALUES (?1, ?2)",
            params![chrono::Utc::now().to_rfc3339(), payload],
        )?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        // Connection flushes on drop; nothing extra to finalize.
        Ok(())
    }
}
