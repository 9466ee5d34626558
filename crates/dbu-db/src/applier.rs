//! SQL script application.
//!
//! Upgrade scripts are plain `;`-separated statement lists. The applier
//! splits them and feeds the statements one by one to a [`ScriptTarget`],
//! either stopping at the first failure or recording it and moving on.

use crate::error::{DbError, DbResult};
use crate::traits::ScriptTarget;
use dbu_core::BackendKind;
use serde::Serialize;

/// What to do when a statement fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementPolicy {
    /// Abort the script and roll back its transaction
    FailFast,
    /// Log the failure and carry on with the next statement
    Continue,
}

impl StatementPolicy {
    /// Default policy for a backend.
    ///
    /// Embedded upgrades always fail fast. Networked upgrades keep going past
    /// failing statements unless `strict` is requested.
    pub fn for_backend(kind: BackendKind, strict: bool) -> Self {
        match kind {
            BackendKind::Embedded => StatementPolicy::FailFast,
            BackendKind::Networked if strict => StatementPolicy::FailFast,
            BackendKind::Networked => StatementPolicy::Continue,
        }
    }
}

/// Split a script into its statements.
///
/// `;` ends a statement unless it sits inside a quoted string, a quoted
/// identifier or a comment. Pieces are trimmed, and pieces holding nothing
/// but comments and whitespace are dropped.
pub fn split_statements(script: &str) -> Vec<&str> {
    let bytes = script.as_bytes();
    let mut statements = Vec::new();
    let mut start = 0;
    let mut has_code = false;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                i = line_end(bytes, i);
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = block_comment_end(bytes, i + 2);
                continue;
            }
            quote @ (b'\'' | b'"' | b'`') => {
                has_code = true;
                i = quoted_end(bytes, i + 1, quote);
                continue;
            }
            b';' => {
                push_statement(&mut statements, &script[start..i], has_code);
                start = i + 1;
                has_code = false;
            }
            b if !b.is_ascii_whitespace() => has_code = true,
            _ => {}
        }
        i += 1;
    }
    push_statement(&mut statements, &script[start..], has_code);

    statements
}

fn push_statement<'a>(statements: &mut Vec<&'a str>, piece: &'a str, has_code: bool) {
    let piece = piece.trim();
    if has_code && !piece.is_empty() {
        statements.push(piece);
    }
}

/// Position of the newline ending a `--` comment
fn line_end(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |p| from + p)
}

/// Position just past the `*/` closing a block comment
fn block_comment_end(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .windows(2)
        .position(|w| w == b"*/")
        .map_or(bytes.len(), |p| from + p + 2)
}

/// Position just past the closing quote. A backslash escapes the next byte,
/// as in MySQL string literals; a doubled quote closes and reopens.
fn quoted_end(bytes: &[u8], from: usize, quote: u8) -> usize {
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// A statement that failed under the `Continue` policy
#[derive(Debug, Clone, Serialize)]
pub struct StatementFailure {
    /// 1-based position of the statement in its script
    pub index: usize,
    pub statement: String,
    /// Driver reason code (SQLSTATE for MySQL, result code for SQLite)
    pub code: Option<String>,
    pub message: String,
}

/// Outcome of applying one script
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApplyReport {
    /// Statements handed to the target
    pub attempted: usize,
    /// Statements the target accepted
    pub succeeded: usize,
    pub failures: Vec<StatementFailure>,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Applies SQL scripts to a target under one statement policy
#[derive(Debug, Clone, Copy)]
pub struct SqlScriptApplier {
    policy: StatementPolicy,
}

impl SqlScriptApplier {
    pub fn new(policy: StatementPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> StatementPolicy {
        self.policy
    }

    /// Apply every statement of `script` to `target`.
    ///
    /// A script without statements is a no-op and does not touch the target.
    pub async fn apply(
        &self,
        target: &mut dyn ScriptTarget,
        script: &str,
    ) -> DbResult<ApplyReport> {
        let statements = split_statements(script);
        let mut report = ApplyReport::default();
        if statements.is_empty() {
            return Ok(report);
        }

        log::debug!(
            "Applying {} statement(s) to {} database {}",
            statements.len(),
            target.db_type(),
            target.describe()
        );

        target.begin().await?;
        for (i, statement) in statements.into_iter().enumerate() {
            let index = i + 1;
            report.attempted += 1;

            match target.execute(statement).await {
                Ok(()) => report.succeeded += 1,
                Err(e) => match self.policy {
                    StatementPolicy::FailFast => {
                        if let Err(rollback_err) = target.rollback().await {
                            log::warn!("Rollback after failed statement also failed: {rollback_err}");
                        }
                        return Err(DbError::ScriptAborted {
                            index,
                            statement: statement.to_string(),
                            source: Box::new(e),
                        });
                    }
                    StatementPolicy::Continue => {
                        log::warn!("Failed to execute sql: {}", e.reason_message());
                        report.failures.push(StatementFailure {
                            index,
                            statement: statement.to_string(),
                            code: e.reason_code().map(str::to_string),
                            message: e.reason_message(),
                        });
                    }
                },
            }
        }
        target.commit().await?;

        Ok(report)
    }
}

#[cfg(test)]
#[path = "applier_test.rs"]
mod tests;
