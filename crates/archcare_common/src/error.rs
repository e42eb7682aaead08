//! Error types shared by readers, rules, sessions and config loading
//!
//! A read never aborts a scan. Every `ReadError` ends up as an `unknown`
//! verdict (or an ERROR log line for actions) and the session moves on.

use std::path::PathBuf;
use thiserror::Error;

/// Why a metric could not be obtained or an action could not complete
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    /// Tool or file is not present on this system
    #[error("{0} is not available")]
    Unavailable(String),

    /// Tool ran but reported failure through its exit status
    #[error("{command} exited with status {code}: {stderr}")]
    ExternalFailure {
        command: String,
        code: i32,
        stderr: String,
    },

    /// Output did not match the expected format
    #[error("could not parse {source_name}: {detail}")]
    ParseFailure { source_name: String, detail: String },
}

impl ReadError {
    pub fn parse(source_name: impl Into<String>, detail: impl Into<String>) -> Self {
        ReadError::ParseFailure {
            source_name: source_name.into(),
            detail: detail.into(),
        }
    }

    /// Short machine-friendly kind name, used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            ReadError::Unavailable(_) => "unavailable",
            ReadError::ExternalFailure { .. } => "external-failure",
            ReadError::ParseFailure { .. } => "parse-failure",
        }
    }
}

/// Rejected threshold rule construction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ThresholdError {
    #[error("rule {rule}: bounds must be finite and non-negative (warn={warn}, critical={critical})")]
    InvalidBound {
        rule: String,
        warn: f64,
        critical: f64,
    },

    #[error("rule {rule}: warn={warn} and critical={critical} are not ordered for {direction}")]
    Misordered {
        rule: String,
        warn: f64,
        critical: f64,
        direction: &'static str,
    },
}

/// Illegal scan session transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session already started")]
    AlreadyStarted,

    #[error("session is not running")]
    NotRunning,
}

/// Configuration loading failure
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
