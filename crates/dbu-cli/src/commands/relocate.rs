//! Relocate-config command implementation
//!
//! Moves legacy config files into the central config directory without
//! touching any database.

use anyhow::{Context, Result};
use dbu_upgrade::{ConfigRelocator, LivenessGuard, RelocationOutcome};

use crate::cli::{GlobalArgs, OutputFormat, RelocateArgs};
use crate::context::build_environment;

/// Execute the relocate-config command
pub(crate) async fn execute(args: &RelocateArgs, global: &GlobalArgs) -> Result<()> {
    let env = build_environment(global)?;
    LivenessGuard::new(&env).ensure_not_running().await?;

    let relocator = ConfigRelocator::new(&env);
    let outcome = relocator
        .relocate()
        .with_context(|| format!("Failed to move config to {}", relocator.destination().display()))?;

    match args.output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&outcome)
                .context("Failed to serialize relocation result")?;
            println!("{json}");
        }
        OutputFormat::Text => match &outcome {
            RelocationOutcome::Moved { files } => {
                for moved in files {
                    println!("  moved {} to {}", moved.from.display(), moved.to.display());
                }
                println!("Moved {} config file(s) to {}", files.len(), relocator.destination().display());
            }
            RelocationOutcome::AlreadyRelocated { stub } => {
                println!("Config already relocated ({} is a stub)", stub.display());
            }
        },
    }
    Ok(())
}
