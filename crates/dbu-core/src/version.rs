//! Server version parsing and comparison.
//!
//! Upgrade targets are named after server releases (`4.3.0`, `5.0.0.1`,
//! `6.0.0-beta`, ...). They double as directory names under `sql/`, so the
//! original string is kept verbatim next to the parsed components.

use crate::error::{CoreError, CoreResult};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// First release that keeps core subsystem config in the central directory.
pub const CENTRAL_CONFIG_THRESHOLD: [u32; 3] = [5, 0, 0];

/// Characters that may open a version suffix
const SUFFIX_SEPARATORS: [char; 4] = ['-', '+', '_', '~'];

/// A server version: dotted numbers with an optional suffix.
///
/// Numbers compare numerically and missing trailing numbers count as zero,
/// so `5.0` and `5.0.0` compare equal. At equal numbers a version without a
/// suffix sorts above one with a suffix (`6.0.0-beta` < `6.0.0`); two
/// suffixes compare as plain strings.
#[derive(Debug, Clone)]
pub struct ServerVersion {
    raw: String,
    numbers: Vec<u32>,
    suffix: Option<String>,
}

impl ServerVersion {
    /// Parse a version string.
    ///
    /// The suffix must start with one of `-+_~` and may only hold ASCII
    /// letters, digits and `.-+_~`, since the version names a directory.
    pub fn parse(s: &str) -> CoreResult<Self> {
        let trimmed = s.trim();
        let invalid = || CoreError::InvalidVersion {
            version: s.to_string(),
        };

        let head_len = trimmed
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(trimmed.len());
        let (head, tail) = trimmed.split_at(head_len);
        if head.is_empty() {
            return Err(invalid());
        }

        let numbers = head
            .split('.')
            .map(|piece| piece.parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| invalid())?;

        let suffix = if tail.is_empty() {
            None
        } else {
            let valid = tail.starts_with(SUFFIX_SEPARATORS)
                && tail.len() > 1
                && tail
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '.' || SUFFIX_SEPARATORS.contains(&c));
            if !valid {
                return Err(invalid());
            }
            Some(tail.to_string())
        };

        Ok(Self {
            raw: trimmed.to_string(),
            numbers,
            suffix,
        })
    }

    /// The version exactly as it was given (used as the `sql/` directory name).
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Suffix after the dotted numbers, separator included
    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    /// Whether core subsystem config lives in the central config directory.
    ///
    /// Only the numbers count: a `5.0.0-beta` build already has the 5.0 layout.
    pub fn uses_central_config(&self) -> bool {
        compare_numbers(&self.numbers, &CENTRAL_CONFIG_THRESHOLD) != Ordering::Less
    }
}

/// Compare dotted numbers, padding the shorter side with zeros
fn compare_numbers(a: &[u32], b: &[u32]) -> Ordering {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let left = a.get(i).copied().unwrap_or(0);
            let right = b.get(i).copied().unwrap_or(0);
            left.cmp(&right)
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

impl FromStr for ServerVersion {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for ServerVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ServerVersion {}

impl PartialOrd for ServerVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ServerVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_numbers(&self.numbers, &other.numbers).then_with(|| {
            match (&self.suffix, &other.suffix) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            }
        })
    }
}

#[cfg(test)]
#[path = "version_test.rs"]
mod tests;
