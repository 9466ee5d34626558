//! dbu-db - Database layer for the database upgrade tool
//!
//! This crate provides the `ScriptTarget` trait with SQLite (embedded) and
//! MySQL (networked) implementations, the factory that opens them, and the
//! applier that runs upgrade scripts against them.

pub mod applier;
pub mod error;
pub mod factory;
pub mod mysql;
pub mod sqlite;
pub mod traits;

pub use applier::{split_statements, ApplyReport, SqlScriptApplier, StatementFailure, StatementPolicy};
pub use error::{DbError, DbResult};
pub use factory::{DriverTargets, TargetFactory};
pub use mysql::MySqlTarget;
pub use sqlite::SqliteTarget;
pub use traits::ScriptTarget;
