//! Opening script targets

use crate::error::DbResult;
use crate::mysql::MySqlTarget;
use crate::sqlite::SqliteTarget;
use crate::traits::ScriptTarget;
use async_trait::async_trait;
use dbu_core::ConnectionInfo;
use std::path::Path;

/// Opens the database a script is applied to.
///
/// The upgrade driver asks for one target per script and drops it once the
/// script has been applied.
#[async_trait]
pub trait TargetFactory: Send + Sync {
    /// Open (or create) an embedded database file
    async fn open_embedded(&self, path: &Path) -> DbResult<Box<dyn ScriptTarget>>;

    /// Connect to a networked database
    async fn open_networked(&self, info: &ConnectionInfo) -> DbResult<Box<dyn ScriptTarget>>;
}

/// Opens real SQLite files and MySQL connections
#[derive(Debug, Clone, Copy, Default)]
pub struct DriverTargets;

#[async_trait]
impl TargetFactory for DriverTargets {
    async fn open_embedded(&self, path: &Path) -> DbResult<Box<dyn ScriptTarget>> {
        Ok(Box::new(SqliteTarget::from_path(path)?))
    }

    async fn open_networked(&self, info: &ConnectionInfo) -> DbResult<Box<dyn ScriptTarget>> {
        Ok(Box::new(MySqlTarget::connect(info).await?))
    }
}
