//! Locating upgrade scripts on disk.
//!
//! Layout: `sql/<version>/<sqlite3|mysql>/<subsystem>.sql`, plus
//! `sql/<version>/sqlite3/ccnet/*.sql` for ccnet component databases.

use crate::error::{UpgradeError, UpgradeResult};
use dbu_core::{BackendKind, EnvironmentContext, ServerVersion, Subsystem};
use std::path::{Path, PathBuf};

/// Maps (version, backend, subsystem) to script files
#[derive(Debug, Clone)]
pub struct ScriptLocator {
    sql_dir: PathBuf,
}

impl ScriptLocator {
    pub fn new(sql_dir: impl Into<PathBuf>) -> Self {
        Self {
            sql_dir: sql_dir.into(),
        }
    }

    pub fn from_env(env: &EnvironmentContext) -> Self {
        Self::new(env.sql_dir())
    }

    /// Directory holding one backend's scripts for a version
    pub fn script_dir(&self, version: &ServerVersion, backend: BackendKind) -> PathBuf {
        self.sql_dir.join(version.as_str()).join(backend.dir_name())
    }

    /// The subsystem's script, or `None` when there is nothing to apply
    pub fn locate(
        &self,
        version: &ServerVersion,
        backend: BackendKind,
        subsystem: Subsystem,
    ) -> Option<PathBuf> {
        let path = self
            .script_dir(version, backend)
            .join(subsystem.script_file_name());
        path.is_file().then_some(path)
    }

    /// Per-component ccnet scripts, sorted by file name.
    ///
    /// Only embedded installations split ccnet across several databases.
    pub fn ccnet_component_scripts(
        &self,
        version: &ServerVersion,
        backend: BackendKind,
    ) -> UpgradeResult<Vec<PathBuf>> {
        if backend != BackendKind::Embedded {
            return Ok(Vec::new());
        }
        let dir = self
            .script_dir(version, backend)
            .join(Subsystem::Ccnet.name());
        glob_sorted(&dir, "*.sql")
    }
}

fn glob_sorted(dir: &Path, file_pattern: &str) -> UpgradeResult<Vec<PathBuf>> {
    let pattern = format!(
        "{}/{}",
        glob::Pattern::escape(&dir.display().to_string()),
        file_pattern
    );
    let io_err = |message: String| UpgradeError::Io {
        path: dir.display().to_string(),
        message,
    };

    let mut paths = glob::glob(&pattern)
        .map_err(|e| io_err(e.to_string()))?
        .map(|entry| entry.map_err(|e| io_err(e.to_string())))
        .collect::<UpgradeResult<Vec<_>>>()?;
    paths.retain(|p| p.is_file());
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
#[path = "locator_test.rs"]
mod tests;
