//! Verdicts and the log levels they map to

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity classification of a single metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Normal,
    Warning,
    Critical,
    /// Value could not be obtained or is not in the lookup table
    Unknown,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Normal => "normal",
            Verdict::Warning => "warning",
            Verdict::Critical => "critical",
            Verdict::Unknown => "unknown",
        }
    }

    pub fn log_level(&self) -> LogLevel {
        match self {
            Verdict::Normal => LogLevel::Success,
            Verdict::Warning | Verdict::Unknown => LogLevel::Warning,
            Verdict::Critical => LogLevel::Error,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Level written into the maintenance log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Success,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Success => "SUCCESS",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "INFO" => Some(LogLevel::Info),
            "WARNING" => Some(LogLevel::Warning),
            "ERROR" => Some(LogLevel::Error),
            "SUCCESS" => Some(LogLevel::Success),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_never_logs_as_success() {
        assert_eq!(Verdict::Unknown.log_level(), LogLevel::Warning);
        assert_eq!(Verdict::Normal.log_level(), LogLevel::Success);
    }

    #[test]
    fn test_log_level_parse_matches_display() {
        for level in [LogLevel::Info, LogLevel::Warning, LogLevel::Error, LogLevel::Success] {
            assert_eq!(LogLevel::parse(level.as_str()), Some(level));
        }
        assert_eq!(LogLevel::parse("WARN"), None);
    }

    #[test]
    fn test_verdict_serialization() {
        let json = serde_json::to_string(&Verdict::Critical).unwrap();
        assert_eq!(json, r#""critical""#);
    }
}
