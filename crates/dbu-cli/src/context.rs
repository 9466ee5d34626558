//! Runtime context for CLI commands

use anyhow::{Context, Result};
use dbu_core::{CoreError, EnvironmentContext};
use std::path::PathBuf;

use crate::cli::GlobalArgs;

/// Build the installation layout from global arguments.
///
/// The ccnet and syncwerk directories are mandatory. Without an explicit
/// upgrade directory the directory of the running executable is used, the
/// same place the packaged scripts ship.
pub(crate) fn build_environment(global: &GlobalArgs) -> Result<EnvironmentContext> {
    let upgrade_dir = match &global.upgrade_dir {
        Some(dir) => dir.clone(),
        None => executable_dir()?,
    };
    let ccnet_dir = required(&global.ccnet_dir, "CCNET_CONF_DIR", "--ccnet-dir")?;
    let syncwerk_dir = required(&global.syncwerk_dir, "SYNCWERK_CONF_DIR", "--syncwerk-dir")?;

    let env = EnvironmentContext::new(
        upgrade_dir,
        ccnet_dir,
        syncwerk_dir,
        global.central_config_dir.clone(),
    );
    log::debug!("Upgrade scripts: {}", env.sql_dir().display());
    Ok(env)
}

fn required(value: &Option<PathBuf>, var: &str, flag: &str) -> Result<PathBuf> {
    value.clone().ok_or_else(|| {
        CoreError::MissingEnvironment {
            name: var.to_string(),
            reason: format!("set it or pass {flag}"),
        }
        .into()
    })
}

fn executable_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate the running executable")?;
    exe.parent()
        .map(|p| p.to_path_buf())
        .with_context(|| format!("Executable {} has no parent directory", exe.display()))
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
