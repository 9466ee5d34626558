//! Database backend kinds and networked connection targets

use serde::Serialize;
use std::fmt;

/// Which family of database a subsystem is configured for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process, file-based database (SQLite)
    Embedded,
    /// Client/server database reached over the network (MySQL)
    Networked,
}

impl BackendKind {
    /// Directory name used under `sql/<version>/` for this backend's scripts
    pub fn dir_name(self) -> &'static str {
        match self {
            BackendKind::Embedded => "sqlite3",
            BackendKind::Networked => "mysql",
        }
    }

    /// Human-readable engine name for progress and error messages
    pub fn engine_name(self) -> &'static str {
        match self {
            BackendKind::Embedded => "SQLite3",
            BackendKind::Networked => "MySQL",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.engine_name())
    }
}

/// One configured networked database target.
///
/// Built by the backend detector from raw config and never mutated
/// afterwards. The password is excluded from `Debug`, `Display` and
/// serialized output.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionInfo {
    pub host: String,
    pub port: u16,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub database_name: String,
    pub unix_socket: Option<String>,
}

impl ConnectionInfo {
    /// Where the client should connect, for log output
    pub fn endpoint(&self) -> String {
        match &self.unix_socket {
            Some(socket) => format!("unix:{socket}"),
            None => format!("{}:{}", self.host, self.port),
        }
    }
}

impl fmt::Debug for ConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionInfo")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("database_name", &self.database_name)
            .field("unix_socket", &self.unix_socket)
            .finish()
    }
}

impl fmt::Display for ConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}/{}",
            self.username,
            self.endpoint(),
            self.database_name
        )
    }
}
