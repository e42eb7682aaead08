//! Append-only maintenance log
//!
//! One text file per category, one line per event:
//! `YYYY-MM-DD HH:MM:SS [LEVEL] message`. Files are only ever appended to;
//! retention is left to external tooling.

use crate::verdict::LogLevel;
use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{create_dir_all, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const TIMESTAMP_LEN: usize = 19;

/// Which log file a line goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogCategory {
    Update,
    Clean,
    Health,
    Security,
    Performance,
}

impl LogCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogCategory::Update => "update",
            LogCategory::Clean => "clean",
            LogCategory::Health => "health",
            LogCategory::Security => "security",
            LogCategory::Performance => "performance",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.log", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogLineError {
    #[error("line too short for a timestamp")]
    MissingTimestamp,
    #[error("bad timestamp: {0}")]
    BadTimestamp(String),
    #[error("missing [LEVEL] tag")]
    MissingLevel,
    #[error("unknown level: {0}")]
    UnknownLevel(String),
}

/// One parsed or to-be-written log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub timestamp: NaiveDateTime,
    pub level: LogLevel,
    pub message: String,
}

impl LogLine {
    /// Stamp with the current local time, truncated to whole seconds so the
    /// written text carries the full value
    pub fn now(level: LogLevel, message: impl AsRef<str>) -> Self {
        let now = Local::now().naive_local();
        let timestamp = now.with_nanosecond(0).unwrap_or(now);
        Self::at(timestamp, level, message)
    }

    /// Line breaks would split one event into two lines; flatten them here
    pub fn at(timestamp: NaiveDateTime, level: LogLevel, message: impl AsRef<str>) -> Self {
        let message = message
            .as_ref()
            .chars()
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();

        Self {
            timestamp,
            level,
            message,
        }
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.level,
            self.message
        )
    }
}

impl FromStr for LogLine {
    type Err = LogLineError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let stamp = line.get(..TIMESTAMP_LEN).ok_or(LogLineError::MissingTimestamp)?;
        let timestamp = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT)
            .map_err(|_| LogLineError::BadTimestamp(stamp.to_string()))?;

        let rest = line[TIMESTAMP_LEN..]
            .strip_prefix(" [")
            .ok_or(LogLineError::MissingLevel)?;
        let (level, message) = rest.split_once("] ").ok_or(LogLineError::MissingLevel)?;
        let level =
            LogLevel::parse(level).ok_or_else(|| LogLineError::UnknownLevel(level.to_string()))?;

        Ok(Self {
            timestamp,
            level,
            message: message.to_string(),
        })
    }
}

/// Append-only writer for one log file
#[derive(Debug, Clone)]
pub struct LogSink {
    path: PathBuf,
}

impl LogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn for_category(dir: &Path, category: LogCategory) -> Self {
        Self::new(dir.join(category.file_name()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line, creating the file and its directory if needed
    pub fn append(&self, line: &LogLine) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        writeln!(file, "{}", line)
    }
}
