//! Reader for the server's INI-style config files.
//!
//! Section names are matched exactly. Key names are case-insensitive, the
//! same way the server itself reads them, so `HOST` and `host` are the same
//! key. Values are taken verbatim without escape processing, since
//! passwords routinely contain backslashes.

use crate::error::{CoreError, CoreResult};
use ini::Ini;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A parsed config file
#[derive(Debug, Clone)]
pub struct ConfigReader {
    path: PathBuf,
    sections: HashMap<String, HashMap<String, String>>,
}

impl ConfigReader {
    /// Load and parse a config file.
    ///
    /// A missing file is a hard stop: without it the backend cannot be
    /// determined.
    pub fn open(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigMissing {
                path: path.display().to_string(),
            });
        }
        let text = std::fs::read_to_string(path).map_err(|e| CoreError::InvalidConfig {
            path: path.display().to_string(),
            reason: format!("cannot read file: {e}"),
        })?;
        Self::parse(path, &text)
    }

    /// Parse config text, attributing errors to `path`
    pub fn parse(path: &Path, text: &str) -> CoreResult<Self> {
        let ini = Ini::load_from_str_noescape(text).map_err(|e| CoreError::InvalidConfig {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        for (section, props) in ini.iter() {
            let Some(section) = section else {
                continue;
            };
            let entries = sections.entry(section.to_string()).or_default();
            for (key, value) in props.iter() {
                entries.insert(key.to_ascii_lowercase(), value.trim().to_string());
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            sections,
        })
    }

    /// Path this config was read from
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// Raw value, `None` when the section or key is absent
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|s| s.get(&key.to_ascii_lowercase()))
            .map(String::as_str)
    }

    /// Value with a fallback for an absent section or key
    pub fn read(&self, section: &str, key: &str, default: &str) -> String {
        self.get(section, key).unwrap_or(default).to_string()
    }

    /// Value that must be present, reported as invalid config otherwise
    pub fn require(&self, section: &str, key: &str) -> CoreResult<String> {
        self.get(section, key)
            .map(str::to_string)
            .ok_or_else(|| self.invalid(format!("No option '{key}' in section: '{section}'")))
    }

    /// Typed value with a fallback; a present but unparseable value is an error
    pub fn read_parsed<T>(&self, section: &str, key: &str, default: T) -> CoreResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(section, key) {
            None => Ok(default),
            Some(raw) => raw
                .parse()
                .map_err(|e| self.invalid(format!("invalid value '{raw}' for '{key}': {e}"))),
        }
    }

    /// Build an `InvalidConfig` error that names this file
    pub fn invalid(&self, reason: impl Into<String>) -> CoreError {
        CoreError::InvalidConfig {
            path: self.path.display().to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
