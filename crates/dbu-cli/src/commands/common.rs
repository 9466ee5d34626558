//! Shared utilities for CLI commands

use std::fmt;

/// Environment variable that turns `migrate` into a no-op
pub(crate) const SKIP_UPGRADE_VAR: &str = "SYNCWERK_SKIP_DB_UPGRADE";

/// Exit status for a failure the command has already printed.
///
/// `main` exits with the wrapped code and prints nothing more. JSON output
/// relies on this to keep stdout a single document.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exit status {}", self.0)
    }
}

impl std::error::Error for ExitCode {}

/// Whether a skip flag value asks for the upgrade to be skipped
pub(crate) fn is_skip_value(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on"
    )
}

/// Value of the skip flag, if it is set and asks for a skip
pub(crate) fn skip_requested() -> Option<String> {
    std::env::var(SKIP_UPGRADE_VAR)
        .ok()
        .filter(|value| is_skip_value(value))
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
