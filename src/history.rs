//! Session log: one CSV row per assembled prompt.
//!
//! The log only ever grows. Rows are never reordered, deduplicated, or
//! rewritten with different content.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::prompt::{Answers, Mode, TargetAi};

/// A single logged session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLogRow {
    /// ISO-8601 UTC timestamp of the render
    pub timestamp: String,

    pub target_ai: TargetAi,

    pub mode: Mode,

    #[serde(rename = "rough")]
    pub rough_idea: String,

    /// The answers mapping as a JSON object
    #[serde(rename = "answers_json")]
    pub answers: String,

    #[serde(rename = "tokens")]
    pub max_length: String,

    #[serde(rename = "extras")]
    pub extra_instructions: String,

    /// Character count of the assembled document
    #[serde(rename = "optimized_len")]
    pub optimized_length: usize,
}

impl SessionLogRow {
    /// Build a row stamped with the current UTC time.
    pub fn now(
        target_ai: TargetAi,
        mode: Mode,
        rough_idea: &str,
        answers: &Answers,
        max_length: &str,
        extra_instructions: &str,
        optimized: &str,
    ) -> Self {
        Self {
            timestamp: Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            target_ai,
            mode,
            rough_idea: rough_idea.to_string(),
            answers: answers.to_json(),
            max_length: max_length.to_string(),
            extra_instructions: extra_instructions.to_string(),
            optimized_length: optimized.chars().count(),
        }
    }
}

/// Handle on the session log file.
#[derive(Debug, Clone)]
pub struct SessionLog {
    path: PathBuf,
}

impl SessionLog {
    /// Log stored at `path`; nothing is touched until the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a row, creating the log if needed.
    ///
    /// The existing log is read in full and the whole table rewritten. If the
    /// existing log cannot be parsed, the file is left untouched.
    pub fn append(&self, row: &SessionLogRow) -> Result<(), Error> {
        let mut rows = self.read_all()?;
        rows.push(row.clone());
        self.write_all(&rows)?;
        tracing::info!(
            path = %self.path.display(),
            rows = rows.len(),
            "appended session log row"
        );
        Ok(())
    }

    /// The last `n` rows, oldest first. Empty if the log does not exist yet.
    pub fn tail(&self, n: usize) -> Result<Vec<SessionLogRow>, Error> {
        let mut rows = self.read_all()?;
        let skip = rows.len().saturating_sub(n);
        Ok(rows.split_off(skip))
    }

    /// Read every row in file order.
    pub fn read_all(&self) -> Result<Vec<SessionLogRow>, Error> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path).map_err(|e| Error::Read {
            path: self.path.display().to_string(),
            source: e,
        })?;

        reader
            .deserialize()
            .enumerate()
            .map(|(i, record)| {
                record.map_err(|e| Error::Malformed {
                    path: self.path.display().to_string(),
                    row: i + 1,
                    source: e,
                })
            })
            .collect()
    }

    /// Rewrite the whole table: write a sibling file, then rename it over the log.
    fn write_all(&self, rows: &[SessionLogRow]) -> Result<(), Error> {
        let staging = self.staging_path();
        let write_error = |source: csv::Error| Error::Write {
            path: self.path.display().to_string(),
            source,
        };

        {
            let mut writer = csv::Writer::from_path(&staging).map_err(write_error)?;
            for row in rows {
                writer.serialize(row).map_err(write_error)?;
            }
            writer.flush().map_err(|e| write_error(e.into()))?;
        }

        fs::rename(&staging, &self.path).map_err(|e| {
            let _ = fs::remove_file(&staging);
            Error::Replace {
                path: self.path.display().to_string(),
                source: e,
            }
        })
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "history.csv".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Errors from reading or writing the session log.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to open session log '{path}'")]
    Read {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("malformed session log '{path}' at row {row}")]
    Malformed {
        path: String,
        row: usize,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write session log '{path}'")]
    Write {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("failed to replace session log '{path}'")]
    Replace {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
