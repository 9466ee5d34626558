//! Script target trait definition

use crate::error::DbResult;
use async_trait::async_trait;

/// A database that upgrade statements can be applied to.
///
/// Targets that support transactions override `begin`, `commit` and
/// `rollback`; the defaults are no-ops for targets that commit every
/// statement on its own.
#[async_trait]
pub trait ScriptTarget: Send {
    /// Start the unit of work covering one script
    async fn begin(&mut self) -> DbResult<()> {
        Ok(())
    }

    /// Execute a single SQL statement
    async fn execute(&mut self, sql: &str) -> DbResult<()>;

    /// Make the script's changes permanent
    async fn commit(&mut self) -> DbResult<()> {
        Ok(())
    }

    /// Discard the script's uncommitted changes
    async fn rollback(&mut self) -> DbResult<()> {
        Ok(())
    }

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;

    /// Which database this target writes to, for logging
    fn describe(&self) -> String;
}
