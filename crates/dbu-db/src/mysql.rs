//! MySQL (networked) script target

use crate::error::{DbError, DbResult};
use crate::traits::ScriptTarget;
use async_trait::async_trait;
use dbu_core::ConnectionInfo;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{Connection, Executor};

/// A connection to one MySQL database, opened per script.
///
/// The server runs in autocommit mode, so every statement is committed as
/// soon as it succeeds and the transaction hooks stay no-ops.
pub struct MySqlTarget {
    conn: MySqlConnection,
    database: String,
}

impl MySqlTarget {
    /// Connect using a detected connection target.
    ///
    /// A configured unix socket takes precedence over host and port.
    pub async fn connect(info: &ConnectionInfo) -> DbResult<Self> {
        let options = connect_options(info);
        let conn = MySqlConnection::connect_with(&options)
            .await
            .map_err(|e| DbError::ConnectionError {
                backend: "mysql",
                database: info.database_name.clone(),
                message: connect_error_message(&e),
            })?;
        log::debug!("Connected to mysql database {info}");
        Ok(Self {
            conn,
            database: info.database_name.clone(),
        })
    }
}

fn connect_options(info: &ConnectionInfo) -> MySqlConnectOptions {
    let options = MySqlConnectOptions::new()
        .username(&info.username)
        .password(&info.password)
        .database(&info.database_name);
    match &info.unix_socket {
        Some(socket) => options.socket(socket),
        None => options.host(&info.host).port(info.port),
    }
}

fn connect_error_message(err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db_err) => db_err.message().to_string(),
        other => other.to_string(),
    }
}

#[async_trait]
impl ScriptTarget for MySqlTarget {
    async fn execute(&mut self, sql: &str) -> DbResult<()> {
        // A bare `&str` carries no arguments, so it goes over the text
        // protocol; DDL cannot always be prepared.
        Executor::execute(&mut self.conn, sql).await?;
        Ok(())
    }

    fn db_type(&self) -> &'static str {
        "mysql"
    }

    fn describe(&self) -> String {
        self.database.clone()
    }
}
