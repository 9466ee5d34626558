//! SQLite (embedded) script target

use crate::error::{DbError, DbResult};
use crate::traits::ScriptTarget;
use async_trait::async_trait;
use rusqlite::Connection;
use std::path::Path;

/// One SQLite database file, held open for the duration of a script.
///
/// All statements of a script run inside a single transaction, so a script
/// either lands completely or not at all.
pub struct SqliteTarget {
    conn: Connection,
    location: String,
}

impl SqliteTarget {
    /// Create a new in-memory SQLite connection
    pub fn in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| DbError::ConnectionError {
            backend: "sqlite",
            database: ":memory:".to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            conn,
            location: ":memory:".to_string(),
        })
    }

    /// Open a database file, creating it if it does not exist yet
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path).map_err(|e| DbError::ConnectionError {
            backend: "sqlite",
            database: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            conn,
            location: path.display().to_string(),
        })
    }

    /// Borrow the underlying connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    fn control(&self, sql: &str) -> DbResult<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| DbError::TransactionError(format!("{sql} failed on {}: {e}", self.location)))
    }
}

#[async_trait]
impl ScriptTarget for SqliteTarget {
    async fn begin(&mut self) -> DbResult<()> {
        self.control("BEGIN")
    }

    async fn execute(&mut self, sql: &str) -> DbResult<()> {
        // Stepped as a query so statements returning rows (PRAGMA, SELECT) succeed.
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        while rows.next()?.is_some() {}
        Ok(())
    }

    async fn commit(&mut self) -> DbResult<()> {
        if let Err(e) = self.control("COMMIT") {
            let _ = self.conn.execute_batch("ROLLBACK");
            return Err(e);
        }
        Ok(())
    }

    async fn rollback(&mut self) -> DbResult<()> {
        self.control("ROLLBACK")
    }

    fn db_type(&self) -> &'static str {
        "sqlite"
    }

    fn describe(&self) -> String {
        self.location.clone()
    }
}

#[cfg(test)]
#[path = "sqlite_test.rs"]
mod tests;
