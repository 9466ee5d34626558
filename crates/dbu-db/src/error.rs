//! Error types for dbu-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Failed to connect to {backend} database {database}: {message}")]
    ConnectionError {
        backend: &'static str,
        database: String,
        message: String,
    },

    /// Statement execution error with the driver's reason code (D002)
    #[error("[D002] SQL execution failed{}: {message}", code_suffix(.code))]
    StatementError {
        code: Option<String>,
        message: String,
    },

    /// A statement aborted its script under the fail-fast policy (D003)
    #[error("[D003] Statement #{index} aborted the script: {source}\n    {statement}")]
    ScriptAborted {
        index: usize,
        statement: String,
        #[source]
        source: Box<DbError>,
    },

    /// Transaction management error (D004)
    #[error("[D004] Transaction failed: {0}")]
    TransactionError(String),
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref()
        .map(|c| format!(" ({c})"))
        .unwrap_or_default()
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Driver reason code of a statement failure, if the driver supplied one
    pub fn reason_code(&self) -> Option<&str> {
        match self {
            DbError::StatementError { code, .. } => code.as_deref(),
            DbError::ScriptAborted { source, .. } => source.reason_code(),
            _ => None,
        }
    }

    /// Driver message without the error code prefix
    pub fn reason_message(&self) -> String {
        match self {
            DbError::StatementError { message, .. } => message.clone(),
            DbError::ScriptAborted { source, .. } => source.reason_message(),
            other => other.to_string(),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        let code = match &err {
            rusqlite::Error::SqliteFailure(failure, _) => Some(format!("{:?}", failure.code)),
            _ => None,
        };
        DbError::StatementError {
            code,
            message: err.to_string(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        // Server-side errors carry the MySQL SQLSTATE; everything else
        // (I/O, protocol) only has a message.
        match &err {
            sqlx::Error::Database(db_err) => DbError::StatementError {
                code: db_err.code().map(|c| c.into_owned()),
                message: db_err.message().to_string(),
            },
            _ => DbError::StatementError {
                code: None,
                message: err.to_string(),
            },
        }
    }
}
