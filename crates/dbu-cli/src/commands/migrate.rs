//! Migrate command implementation

use anyhow::{Context, Result};
use dbu_core::ServerVersion;
use dbu_upgrade::{
    MigrationDispatcher, MigrationOptions, MigrationReport, OutcomeStatus, UpgradeResult,
};
use serde::Serialize;

use crate::cli::{GlobalArgs, MigrateArgs, OutputFormat};
use crate::commands::common::{skip_requested, ExitCode, SKIP_UPGRADE_VAR};
use crate::context::build_environment;

/// JSON document printed when a run aborts
#[derive(Debug, Serialize)]
struct FailedRun<'a> {
    version: &'a str,
    status: &'static str,
    error: String,
}

/// Execute the migrate command
pub(crate) async fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    if let Some(value) = skip_requested() {
        println!("Database upgrade skipped because {SKIP_UPGRADE_VAR}={value}");
        return Ok(());
    }

    let version = ServerVersion::parse(&args.version)?;
    let env = build_environment(global)?;
    let options = MigrationOptions {
        strict: args.strict,
        dry_run: args.dry_run,
        relocate_config: args.relocate_config,
    };

    let result = MigrationDispatcher::new(&env, options).run(&version).await;
    finish(result, &version, args.output)
}

/// Print the outcome of a run.
///
/// A completed run succeeds even when statements failed under the fail-soft
/// policy; those are listed in the output. Only an aborted run is an error.
fn finish(
    result: UpgradeResult<MigrationReport>,
    version: &ServerVersion,
    output: OutputFormat,
) -> Result<()> {
    match result {
        Ok(report) => match output {
            OutputFormat::Text => {
                print_text(&report);
                Ok(())
            }
            OutputFormat::Json => print_json(&report),
        },
        Err(err) => match output {
            OutputFormat::Text => {
                Err(anyhow::Error::new(err).context(format!("Database upgrade to {version} failed")))
            }
            OutputFormat::Json => {
                print_json(&FailedRun {
                    version: version.as_str(),
                    status: "failed",
                    error: err.to_string(),
                })?;
                Err(ExitCode(1).into())
            }
        },
    }
}

fn print_text(report: &MigrationReport) {
    for moved in &report.relocated_configs {
        println!("  moved {} to {}", moved.from.display(), moved.to.display());
    }
    for outcome in &report.outcomes {
        match &outcome.status {
            OutcomeStatus::Applied { report } => {
                println!(
                    "  {:<16} applied {}/{} statement(s)",
                    outcome.target, report.succeeded, report.attempted
                );
                for failure in &report.failures {
                    println!(
                        "    statement {} failed: {}",
                        failure.index, failure.message
                    );
                }
            }
            OutcomeStatus::Planned => {
                let script = outcome
                    .script
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                println!("  {:<16} would apply {}", outcome.target, script);
            }
            OutcomeStatus::Skipped { reason } => {
                println!("  {:<16} skipped ({reason})", outcome.target);
            }
        }
    }
    println!();
    println!("{}", report.summary_line());
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize upgrade report")?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
#[path = "migrate_test.rs"]
mod tests;
