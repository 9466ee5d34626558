//! Upgrade run results

use crate::relocate::MovedConfig;
use dbu_core::BackendKind;
use dbu_db::{ApplyReport, StatementPolicy};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Why a subsystem was left untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No script for this subsystem at the target version
    NoScript,
    /// Script present, but the professional edition is not installed
    NotProfessionalEdition,
    /// Script present, but the subsystem has no embedded database
    UnsupportedOnEmbedded,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoScript => write!(f, "no script"),
            SkipReason::NotProfessionalEdition => write!(f, "professional edition only"),
            SkipReason::UnsupportedOnEmbedded => write!(f, "not supported on sqlite3"),
        }
    }
}

/// What happened to one database
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Applied { report: ApplyReport },
    Skipped { reason: SkipReason },
    /// Would be applied; recorded by dry runs
    Planned,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubsystemOutcome {
    /// Subsystem name, or `ccnet/<component>` for component scripts
    pub target: String,
    pub script: Option<PathBuf>,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

/// Result of a completed upgrade run
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub version: String,
    pub backend: BackendKind,
    pub policy: StatementPolicy,
    pub dry_run: bool,
    pub outcomes: Vec<SubsystemOutcome>,
    /// Config files moved into the central directory before detection
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub relocated_configs: Vec<MovedConfig>,
}

impl MigrationReport {
    pub fn new(version: &str, backend: BackendKind, policy: StatementPolicy, dry_run: bool) -> Self {
        Self {
            version: version.to_string(),
            backend,
            policy,
            dry_run,
            outcomes: Vec::new(),
            relocated_configs: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, target: impl Into<String>, script: Option<PathBuf>, status: OutcomeStatus) {
        self.outcomes.push(SubsystemOutcome {
            target: target.into(),
            script,
            status,
        });
    }

    /// Number of scripts applied (or planned, for dry runs)
    pub fn scripts_applied(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Applied { .. } | OutcomeStatus::Planned))
            .count()
    }

    /// Statements that failed under the fail-soft policy
    pub fn statement_failures(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match &o.status {
                OutcomeStatus::Applied { report } => report.failures.len(),
                _ => 0,
            })
            .sum()
    }

    /// Outcome for a target name
    pub fn outcome(&self, target: &str) -> Option<&SubsystemOutcome> {
        self.outcomes.iter().find(|o| o.target == target)
    }

    /// One-line summary for the operator
    pub fn summary_line(&self) -> String {
        let verb = if self.dry_run { "would apply" } else { "applied" };
        let mut line = format!(
            "Database upgrade to {} ({}) {} {} script(s)",
            self.version,
            self.backend,
            verb,
            self.scripts_applied()
        );
        let failures = self.statement_failures();
        if failures > 0 {
            line.push_str(&format!(", {failures} statement(s) failed and were skipped"));
        }
        line
    }
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
