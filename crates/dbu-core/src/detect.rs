//! Backend detection.
//!
//! Each configured subsystem is inspected independently, then the results
//! must agree: a run upgrades either only embedded databases or only
//! networked ones.

use crate::backend::{BackendKind, ConnectionInfo};
use crate::config::ConfigReader;
use crate::environment::EnvironmentContext;
use crate::error::{CoreError, CoreResult};
use crate::subsystem::Subsystem;
use crate::version::ServerVersion;
use std::collections::BTreeMap;
use std::path::PathBuf;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3306;

/// How one subsystem's config file names its database settings.
///
/// Maps the file's own section and key names onto [`ConnectionInfo`] fields.
#[derive(Debug, Clone, Copy)]
pub struct ConfigLayout {
    pub file_name: &'static str,
    pub section: &'static str,
    pub engine_key: &'static str,
    pub host_key: &'static str,
    pub port_key: &'static str,
    pub user_key: &'static str,
    pub password_key: &'static str,
    pub database_key: &'static str,
    /// Dedicated socket key; when absent a host starting with `/` is a socket
    pub unix_socket_key: Option<&'static str>,
    pub embedded_engines: &'static [&'static str],
    pub networked_engines: &'static [&'static str],
}

pub const CCNET_LAYOUT: ConfigLayout = ConfigLayout {
    file_name: "ccnet.conf",
    section: "Database",
    engine_key: "ENGINE",
    host_key: "HOST",
    port_key: "PORT",
    user_key: "USER",
    password_key: "PASSWD",
    database_key: "DB",
    unix_socket_key: Some("UNIX_SOCKET"),
    embedded_engines: &["sqlite", "sqlite3"],
    networked_engines: &["mysql"],
};

pub const SYNCWERK_LAYOUT: ConfigLayout = ConfigLayout {
    file_name: "server.conf",
    section: "database",
    engine_key: "type",
    host_key: "host",
    port_key: "port",
    user_key: "user",
    password_key: "password",
    database_key: "db_name",
    unix_socket_key: Some("unix_socket"),
    embedded_engines: &["sqlite", "sqlite3"],
    networked_engines: &["mysql"],
};

pub const RESTAPI_LAYOUT: ConfigLayout = ConfigLayout {
    file_name: "restapi.conf",
    section: "database",
    engine_key: "ENGINE",
    host_key: "HOST",
    port_key: "PORT",
    user_key: "USER",
    password_key: "PASSWORD",
    database_key: "NAME",
    unix_socket_key: None,
    embedded_engines: &["django.db.backends.sqlite3", "sqlite3"],
    networked_engines: &["django.db.backends.mysql", "mysql"],
};

impl ConfigLayout {
    /// Layout of the file that configures a subsystem's database.
    ///
    /// syncwevents has no config of its own and lives in the restapi database.
    pub fn for_subsystem(subsystem: Subsystem) -> &'static ConfigLayout {
        match subsystem {
            Subsystem::Ccnet => &CCNET_LAYOUT,
            Subsystem::Syncwerk => &SYNCWERK_LAYOUT,
            Subsystem::Restapi | Subsystem::Syncwevents => &RESTAPI_LAYOUT,
        }
    }
}

/// Backend chosen by a single subsystem's config
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubsystemBackend {
    Embedded,
    Networked(ConnectionInfo),
}

impl SubsystemBackend {
    pub fn kind(&self) -> BackendKind {
        match self {
            SubsystemBackend::Embedded => BackendKind::Embedded,
            SubsystemBackend::Networked(_) => BackendKind::Networked,
        }
    }
}

/// Outcome of detection across all configured subsystems
#[derive(Debug, Clone)]
pub struct Detection {
    pub kind: BackendKind,
    /// Populated for every configured subsystem when `kind` is networked
    pub connections: BTreeMap<Subsystem, ConnectionInfo>,
}

impl Detection {
    /// Connection for a subsystem; syncwevents shares the restapi database
    pub fn connection(&self, subsystem: Subsystem) -> Option<&ConnectionInfo> {
        let key = match subsystem {
            Subsystem::Syncwevents => Subsystem::Restapi,
            other => other,
        };
        self.connections.get(&key)
    }
}

/// Interpret one subsystem's config under its layout
pub fn classify(
    subsystem: Subsystem,
    layout: &ConfigLayout,
    config: &ConfigReader,
) -> CoreResult<SubsystemBackend> {
    if !config.has_section(layout.section) {
        return Ok(SubsystemBackend::Embedded);
    }

    let engine = config.require(layout.section, layout.engine_key)?;
    let matches_engine = |names: &[&str]| names.iter().any(|n| n.eq_ignore_ascii_case(&engine));

    if matches_engine(layout.embedded_engines) {
        return Ok(SubsystemBackend::Embedded);
    }
    if !matches_engine(layout.networked_engines) {
        return Err(CoreError::UnsupportedBackend {
            subsystem: subsystem.name().to_string(),
            engine,
            path: config.path().display().to_string(),
        });
    }

    let section = layout.section;
    let host = config.read(section, layout.host_key, DEFAULT_HOST);
    let port = config.read_parsed(section, layout.port_key, DEFAULT_PORT)?;
    let username = config.require(section, layout.user_key)?;
    let password = config.require(section, layout.password_key)?;
    let database_name = config.require(section, layout.database_key)?;

    let unix_socket = match layout.unix_socket_key {
        Some(key) => Some(config.read(section, key, "")),
        None => host.starts_with('/').then(|| host.clone()),
    }
    .filter(|s| !s.is_empty());

    Ok(SubsystemBackend::Networked(ConnectionInfo {
        host,
        port,
        username,
        password,
        database_name,
        unix_socket,
    }))
}

/// Determines the backend of an installation from its config files
pub struct BackendDetector<'a> {
    env: &'a EnvironmentContext,
}

impl<'a> BackendDetector<'a> {
    pub fn new(env: &'a EnvironmentContext) -> Self {
        Self { env }
    }

    /// Config file a subsystem is read from when upgrading to `version`
    pub fn config_path(&self, subsystem: Subsystem, version: &ServerVersion) -> CoreResult<PathBuf> {
        let layout = ConfigLayout::for_subsystem(subsystem);
        let dir = match subsystem {
            Subsystem::Ccnet | Subsystem::Syncwerk => self.env.core_config_dir(subsystem, version)?,
            Subsystem::Restapi | Subsystem::Syncwevents => {
                self.env.restapi_config_dir().to_path_buf()
            }
        };
        Ok(dir.join(layout.file_name))
    }

    /// Detect the backend of a single configured subsystem
    pub fn detect_subsystem(
        &self,
        subsystem: Subsystem,
        version: &ServerVersion,
    ) -> CoreResult<SubsystemBackend> {
        let path = self.config_path(subsystem, version)?;
        let layout = ConfigLayout::for_subsystem(subsystem);
        log::debug!("Reading {} database config from {}", subsystem, path.display());
        let config = ConfigReader::open(&path)?;
        classify(subsystem, layout, &config)
    }

    /// Detect the backend shared by all configured subsystems.
    ///
    /// Mixed configurations are rejected rather than guessed at.
    pub fn detect(&self, version: &ServerVersion) -> CoreResult<Detection> {
        let mut found = Vec::with_capacity(Subsystem::CONFIGURED.len());
        for subsystem in Subsystem::CONFIGURED {
            found.push((subsystem, self.detect_subsystem(subsystem, version)?));
        }

        let kind = found[0].1.kind();
        if found.iter().any(|(_, backend)| backend.kind() != kind) {
            let details = found
                .iter()
                .map(|(s, backend)| format!(" {} is using {}", s, backend.kind()))
                .collect::<Vec<_>>()
                .join("\n");
            return Err(CoreError::InconsistentBackend { details });
        }

        let connections = found
            .into_iter()
            .filter_map(|(s, backend)| match backend {
                SubsystemBackend::Networked(info) => Some((s, info)),
                SubsystemBackend::Embedded => None,
            })
            .collect();

        log::info!("You are using {kind}");
        Ok(Detection { kind, connections })
    }
}

#[cfg(test)]
#[path = "detect_test.rs"]
mod tests;
