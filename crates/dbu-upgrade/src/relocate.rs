//! Moving product config into the central config directory.
//!
//! From 5.0.0 on the server reads `ccnet.conf`, `server.conf` and
//! `restapi.conf` from one central directory. Installations upgraded from an
//! older release still keep them next to each subsystem's data. Relocation
//! copies every file to the central directory and overwrites the old copy
//! with a one-line stub pointing at the new location.

use crate::error::{UpgradeError, UpgradeResult};
use dbu_core::{ConfigLayout, CoreError, EnvironmentContext, Subsystem};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Text every stub contains; a config holding it has already been moved
pub const MOVED_MARKER: &str = "This file has been moved";

/// Directory created under `top_dir` when no central directory is configured
const DEFAULT_CENTRAL_DIR_NAME: &str = "conf";

/// One config file copied to the central directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovedConfig {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Result of a relocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RelocationOutcome {
    Moved { files: Vec<MovedConfig> },
    /// A stub was found, nothing was touched
    AlreadyRelocated { stub: PathBuf },
}

pub struct ConfigRelocator<'a> {
    env: &'a EnvironmentContext,
}

impl<'a> ConfigRelocator<'a> {
    pub fn new(env: &'a EnvironmentContext) -> Self {
        Self { env }
    }

    /// Central directory the configs end up in
    pub fn destination(&self) -> PathBuf {
        self.env
            .central_config_dir
            .clone()
            .unwrap_or_else(|| self.env.top_dir.join(DEFAULT_CENTRAL_DIR_NAME))
    }

    /// Legacy location of each config file
    pub fn sources(&self) -> Vec<PathBuf> {
        Subsystem::CONFIGURED
            .iter()
            .map(|&subsystem| {
                let dir = match subsystem {
                    Subsystem::Ccnet => &self.env.ccnet_dir,
                    Subsystem::Syncwerk => &self.env.syncwerk_dir,
                    Subsystem::Restapi | Subsystem::Syncwevents => &self.env.top_dir,
                };
                dir.join(ConfigLayout::for_subsystem(subsystem).file_name)
            })
            .collect()
    }

    /// Copy every legacy config to the central directory and leave stubs.
    ///
    /// All sources must exist before anything is written. If any of them is
    /// already a stub the installation counts as relocated and is left alone.
    pub fn relocate(&self) -> UpgradeResult<RelocationOutcome> {
        let sources = self.sources();
        let mut contents = Vec::with_capacity(sources.len());
        for source in &sources {
            if !source.is_file() {
                return Err(CoreError::ConfigMissing {
                    path: source.display().to_string(),
                }
                .into());
            }
            let text = std::fs::read_to_string(source).map_err(|e| io_error(source, e))?;
            if text.contains(MOVED_MARKER) {
                log::info!("{} has already been moved, skipping relocation", source.display());
                return Ok(RelocationOutcome::AlreadyRelocated {
                    stub: source.clone(),
                });
            }
            contents.push(text);
        }

        let destination = self.destination();
        std::fs::create_dir_all(&destination).map_err(|e| io_error(&destination, e))?;

        let mut files = Vec::with_capacity(sources.len());
        for (source, text) in sources.into_iter().zip(contents) {
            let Some(name) = source.file_name() else {
                continue;
            };
            let target = destination.join(name);
            std::fs::write(&target, text).map_err(|e| io_error(&target, e))?;
            let stub = format!(
                "# {MOVED_MARKER} to {} in syncwerk 5.0.0\n",
                target.display()
            );
            std::fs::write(&source, stub).map_err(|e| io_error(&source, e))?;
            log::info!("moved {} to {}", source.display(), target.display());
            files.push(MovedConfig {
                from: source,
                to: target,
            });
        }

        Ok(RelocationOutcome::Moved { files })
    }
}

fn io_error(path: &Path, err: std::io::Error) -> UpgradeError {
    UpgradeError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
#[path = "relocate_test.rs"]
mod tests;
