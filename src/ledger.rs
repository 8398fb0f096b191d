//! Vendor hash ledger.
//!
//! An append-only text file with one `label: identifier` line per vendored
//! component. Labels are not unique; re-running an operation appends again.

use chrono::NaiveDate;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Prefix of the identifier used when no commit can be resolved.
pub const PLACEHOLDER_PREFIX: &str = "unknown-";

/// Placeholder identifier for the given date, e.g. `unknown-2024-03-09`.
pub fn placeholder(date: NaiveDate) -> String {
    format!("{}{}", PLACEHOLDER_PREFIX, date.format("%Y-%m-%d"))
}

#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the ledger, or truncate it if it already exists.
    pub fn reset(&self) -> Result<()> {
        self.ensure_parent()?;
        fs::write(&self.path, "")?;
        Ok(())
    }

    /// Append a single `label: value` line.
    pub fn append(&self, label: &str, value: &str) -> Result<()> {
        self.ensure_parent()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{label}: {value}")?;
        Ok(())
    }

    /// Append the resolved commit, or a dated placeholder when there is none.
    ///
    /// Returns the value that was written.
    pub fn record(&self, label: &str, commit: Option<String>, today: NaiveDate) -> Result<String> {
        let value = commit.unwrap_or_else(|| placeholder(today));
        self.append(label, &value)?;
        Ok(value)
    }

    /// All entries as `(label, value)` pairs. A missing ledger has no entries.
    pub fn entries(&self) -> Result<Vec<(String, String)>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)?;
        Ok(content
            .lines()
            .filter_map(|line| line.split_once(": "))
            .map(|(label, value)| (label.to_string(), value.to_string()))
            .collect())
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}
