//! Resolved directory layout of a server installation.
//!
//! ```text
//! <top_dir>/
//!   restapi.db
//!   <install_dir>/            e.g. syncwerk-server-5.0.0
//!     pro/                    present only in the professional edition
//!     <upgrade_dir>/
//!       sql/<version>/<sqlite3|mysql>/<subsystem>.sql
//! ```
//!
//! The ccnet, syncwerk and central config directories are configured
//! independently and may live anywhere.

use crate::error::{CoreError, CoreResult};
use crate::subsystem::{CcnetComponent, Subsystem};
use crate::version::ServerVersion;
use std::path::{Path, PathBuf};

/// Environment variable naming the central config directory
pub const CENTRAL_CONF_DIR_VAR: &str = "SYNCWERK_CENTRAL_CONF_DIR";

/// Directory layout for one upgrade run, built once and passed by reference
#[derive(Debug, Clone)]
pub struct EnvironmentContext {
    /// Directory holding `sql/`
    pub upgrade_dir: PathBuf,
    /// Installed server release directory (parent of `upgrade_dir`)
    pub install_dir: PathBuf,
    /// Directory containing the installed releases (parent of `install_dir`)
    pub top_dir: PathBuf,
    pub ccnet_dir: PathBuf,
    pub syncwerk_dir: PathBuf,
    pub central_config_dir: Option<PathBuf>,
}

impl EnvironmentContext {
    /// Build the context, deriving `install_dir` and `top_dir` from `upgrade_dir`.
    pub fn new(
        upgrade_dir: impl Into<PathBuf>,
        ccnet_dir: impl Into<PathBuf>,
        syncwerk_dir: impl Into<PathBuf>,
        central_config_dir: Option<PathBuf>,
    ) -> Self {
        let upgrade_dir = upgrade_dir.into();
        let install_dir = parent_or_self(&upgrade_dir);
        let top_dir = parent_or_self(&install_dir);
        Self {
            upgrade_dir,
            install_dir,
            top_dir,
            ccnet_dir: ccnet_dir.into(),
            syncwerk_dir: syncwerk_dir.into(),
            central_config_dir,
        }
    }

    /// Root of the versioned script tree
    pub fn sql_dir(&self) -> PathBuf {
        self.upgrade_dir.join("sql")
    }

    /// Marker whose presence identifies the professional edition
    pub fn pro_marker(&self) -> PathBuf {
        self.install_dir.join("pro")
    }

    pub fn is_pro(&self) -> bool {
        self.pro_marker().exists()
    }

    /// Directory holding a core subsystem's config for the given target version.
    ///
    /// From 5.0.0 on, core config lives in the central directory. Earlier
    /// layouts keep it next to each subsystem's data.
    pub fn core_config_dir(
        &self,
        subsystem: Subsystem,
        version: &ServerVersion,
    ) -> CoreResult<PathBuf> {
        if version.uses_central_config() {
            return self
                .central_config_dir
                .clone()
                .ok_or_else(|| CoreError::MissingEnvironment {
                    name: CENTRAL_CONF_DIR_VAR.to_string(),
                    reason: format!(
                        "version {version} keeps {subsystem} config in the central config directory"
                    ),
                });
        }
        match subsystem {
            Subsystem::Ccnet => Ok(self.ccnet_dir.clone()),
            _ => Ok(self.syncwerk_dir.clone()),
        }
    }

    /// Directory holding the restapi config (not version gated)
    pub fn restapi_config_dir(&self) -> &Path {
        self.central_config_dir.as_deref().unwrap_or(&self.top_dir)
    }

    /// Embedded database file for a subsystem, if it has one
    pub fn embedded_db_path(&self, subsystem: Subsystem) -> Option<PathBuf> {
        match subsystem {
            Subsystem::Ccnet => Some(self.ccnet_dir.join("ccnet.db")),
            Subsystem::Syncwerk => Some(self.syncwerk_dir.join("syncwerk.db")),
            Subsystem::Restapi => Some(self.top_dir.join("restapi.db")),
            Subsystem::Syncwevents => None,
        }
    }

    /// Embedded database file for a ccnet component
    pub fn ccnet_component_path(&self, component: &CcnetComponent) -> PathBuf {
        self.ccnet_dir.join(component.relative_path)
    }

    /// `ccnet.conf` used to locate the running server's control channel.
    ///
    /// Prefers the central copy when one exists.
    pub fn ccnet_control_config(&self) -> PathBuf {
        if let Some(central) = &self.central_config_dir {
            let path = central.join("ccnet.conf");
            if path.exists() {
                return path;
            }
        }
        self.ccnet_dir.join("ccnet.conf")
    }
}

fn parent_or_self(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(path)
        .to_path_buf()
}

#[cfg(test)]
#[path = "environment_test.rs"]
mod tests;
