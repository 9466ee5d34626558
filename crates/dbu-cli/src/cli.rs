//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// dbu - upgrade the databases of a Syncwerk server installation
#[derive(Parser, Debug)]
#[command(name = "dbu")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Installation layout, shared by all commands
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding the `sql/` script tree (default: directory of this executable)
    #[arg(long, global = true, env = "SYNCWERK_UPGRADE_DIR")]
    pub upgrade_dir: Option<PathBuf>,

    /// ccnet data directory
    #[arg(long, global = true, env = "CCNET_CONF_DIR")]
    pub ccnet_dir: Option<PathBuf>,

    /// syncwerk data directory
    #[arg(long, global = true, env = "SYNCWERK_CONF_DIR")]
    pub syncwerk_dir: Option<PathBuf>,

    /// Central config directory used from 5.0.0 on
    #[arg(long, global = true, env = "SYNCWERK_CENTRAL_CONF_DIR")]
    pub central_config_dir: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply the upgrade scripts for a server version
    Migrate(MigrateArgs),

    /// Show which database backend would be upgraded
    Detect(DetectArgs),

    /// Move ccnet.conf, server.conf and restapi.conf into the central config directory
    RelocateConfig(RelocateArgs),
}

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Server version being upgraded to, e.g. 5.0.0
    #[arg(value_name = "TARGET_VERSION")]
    pub version: String,

    /// Abort on the first failing statement on MySQL too
    #[arg(long)]
    pub strict: bool,

    /// List the scripts that would run without touching any database
    #[arg(long)]
    pub dry_run: bool,

    /// Move legacy config into the central config directory before upgrading
    #[arg(long, conflicts_with = "dry_run")]
    pub relocate_config: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the detect command
#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Server version whose config layout is inspected
    #[arg(value_name = "TARGET_VERSION")]
    pub version: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the relocate-config command
#[derive(Args, Debug)]
pub struct RelocateArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable lines
    Text,
    /// JSON document on stdout
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
