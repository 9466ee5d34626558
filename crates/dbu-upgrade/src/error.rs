//! Error types for dbu-upgrade

use dbu_core::CoreError;
use dbu_db::DbError;
use thiserror::Error;

/// Errors that abort an upgrade run
#[derive(Error, Debug)]
pub enum UpgradeError {
    /// U001: The server answered on its control channel
    #[error("[U001] Syncwerk server is running ({endpoint})! You must turn it off before upgrading the databases")]
    ServerRunning { endpoint: String },

    /// Configuration or detection failure
    #[error(transparent)]
    Core(#[from] CoreError),

    /// U002: Connecting to or updating a subsystem database failed
    #[error("[U002] Failed to update {target} database: {source}")]
    Db {
        target: String,
        #[source]
        source: DbError,
    },

    /// U003: Per-component script with no matching ccnet database
    #[error("[U003] No ccnet component database matches script {path}")]
    UnknownComponent { path: String },

    /// U004: Script file could not be read or listed
    #[error("[U004] Failed to read {path}: {message}")]
    Io { path: String, message: String },

    /// U005: Networked backend detected but no connection for this database
    #[error("[U005] No connection settings detected for {target} database")]
    MissingConnection { target: String },
}

/// Result type alias for UpgradeError
pub type UpgradeResult<T> = Result<T, UpgradeError>;
