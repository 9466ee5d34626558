//! Detect command implementation
//!
//! Reads the subsystem configs for a target version and reports the backend
//! an upgrade would use. No database is opened.

use anyhow::{Context, Result};
use dbu_core::{BackendDetector, BackendKind, ConnectionInfo, ServerVersion, Subsystem};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::cli::{DetectArgs, GlobalArgs, OutputFormat};
use crate::context::build_environment;

#[derive(Debug, Serialize)]
struct DetectOutput<'a> {
    version: &'a str,
    backend: BackendKind,
    configs: BTreeMap<&'static str, PathBuf>,
    connections: BTreeMap<&'static str, &'a ConnectionInfo>,
}

/// Execute the detect command
pub(crate) fn execute(args: &DetectArgs, global: &GlobalArgs) -> Result<()> {
    let version = ServerVersion::parse(&args.version)?;
    let env = build_environment(global)?;
    let detector = BackendDetector::new(&env);

    let detection = detector.detect(&version)?;
    let mut configs = BTreeMap::new();
    for subsystem in Subsystem::CONFIGURED {
        configs.insert(subsystem.name(), detector.config_path(subsystem, &version)?);
    }

    let output = DetectOutput {
        version: version.as_str(),
        backend: detection.kind,
        configs,
        connections: detection
            .connections
            .iter()
            .map(|(subsystem, info)| (subsystem.name(), info))
            .collect(),
    };

    match args.output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&output)
                .context("Failed to serialize detection result")?;
            println!("{json}");
        }
        OutputFormat::Text => {
            println!("Backend: {}", output.backend);
            for (name, path) in &output.configs {
                match output.connections.get(name) {
                    Some(info) => println!("  {name:<10} {info}  ({})", path.display()),
                    None => println!("  {name:<10} {}", path.display()),
                }
            }
        }
    }
    Ok(())
}
