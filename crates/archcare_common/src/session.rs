//! Scan session: Idle -> Running -> Finalized
//!
//! A session is passed explicitly to every check. Scoring is binary for
//! every scan kind: a scoreable record always counts toward `total`, and
//! counts toward `score` only when its verdict is normal.

use crate::error::SessionError;
use crate::log_file::LogCategory;
use crate::metric::Metric;
use crate::threshold::ThresholdRule;
use crate::verdict::Verdict;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Running,
    Finalized,
}

/// Whether a record affects the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scoring {
    Scored,
    Informational,
}

/// One check result inside a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRecord {
    pub check: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<Metric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<ThresholdRule>,
    pub verdict: Verdict,
    pub message: String,
    pub scoring: Scoring,
}

impl CheckRecord {
    pub fn new(check: impl Into<String>, verdict: Verdict, message: impl Into<String>) -> Self {
        Self {
            check: check.into(),
            metric: None,
            rule: None,
            verdict,
            message: message.into(),
            scoring: Scoring::Scored,
        }
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = Some(metric);
        self
    }

    pub fn with_rule(mut self, rule: ThresholdRule) -> Self {
        self.rule = Some(rule);
        self
    }

    pub fn informational(mut self) -> Self {
        self.scoring = Scoring::Informational;
        self
    }
}

/// Coarse classification of a finished session's percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Excellent,
    Good,
    Moderate,
    Poor,
}

impl Band {
    /// Banding reuses the threshold classifier on the integer percentage:
    /// <=49 poor, 50-74 moderate, 75-89 good, >=90 excellent
    pub fn from_percentage(percentage: u8) -> Self {
        let p = f64::from(percentage);
        let pass = band_rule("session-pass", 74.0, 49.0);
        match pass.map(|r| r.classify(p)) {
            Some(Verdict::Critical) => Band::Poor,
            Some(Verdict::Warning) => Band::Moderate,
            _ => match band_rule("session-excellence", 89.0, 74.0).map(|r| r.classify(p)) {
                Some(Verdict::Normal) => Band::Excellent,
                _ => Band::Good,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Band::Excellent => "excellent",
            Band::Good => "good",
            Band::Moderate => "moderate",
            Band::Poor => "poor",
        }
    }
}

fn band_rule(name: &str, warn: f64, critical: f64) -> Option<ThresholdRule> {
    ThresholdRule::lower_is_worse(name, warn, critical).ok()
}

/// Per-verdict counts in a summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictCounts {
    pub normal: u32,
    pub warning: u32,
    pub critical: u32,
    pub unknown: u32,
}

impl VerdictCounts {
    fn add(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Normal => self.normal += 1,
            Verdict::Warning => self.warning += 1,
            Verdict::Critical => self.critical += 1,
            Verdict::Unknown => self.unknown += 1,
        }
    }
}

/// What remains of a session once finalized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub category: LogCategory,
    pub score: u32,
    pub total: u32,
    pub percentage: u8,
    pub band: Band,
    pub counts: VerdictCounts,
    pub records: Vec<CheckRecord>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SessionSummary {
    pub fn has_critical(&self) -> bool {
        self.counts.critical > 0
    }
}

/// `floor(score * 100 / total)`, 0 for an empty session
pub fn percentage(score: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = u64::from(score) * 100 / u64::from(total);
    pct.min(100) as u8
}

/// One end-to-end run of a set of checks
#[derive(Debug, Clone)]
pub struct ScanSession {
    id: Uuid,
    category: LogCategory,
    state: SessionState,
    records: Vec<CheckRecord>,
    score: u32,
    total: u32,
    started_at: Option<DateTime<Utc>>,
}

impl ScanSession {
    pub fn new(category: LogCategory) -> Self {
        Self {
            id: Uuid::new_v4(),
            category,
            state: SessionState::Idle,
            records: Vec::new(),
            score: 0,
            total: 0,
            started_at: None,
        }
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::AlreadyStarted);
        }
        self.state = SessionState::Running;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    pub fn record(&mut self, record: CheckRecord) -> Result<(), SessionError> {
        if self.state != SessionState::Running {
            return Err(SessionError::NotRunning);
        }

        if record.scoring == Scoring::Scored {
            self.total += 1;
            if record.verdict == Verdict::Normal {
                self.score += 1;
            }
        }
        self.records.push(record);
        Ok(())
    }

    /// Close the session. Consumes it, so there is no way back to Running.
    pub fn finalize(mut self) -> Result<SessionSummary, SessionError> {
        if self.state != SessionState::Running {
            return Err(SessionError::NotRunning);
        }
        self.state = SessionState::Finalized;

        let mut counts = VerdictCounts::default();
        for record in &self.records {
            counts.add(record.verdict);
        }

        let percentage = percentage(self.score, self.total);
        let finished_at = Utc::now();

        Ok(SessionSummary {
            id: self.id,
            category: self.category,
            score: self.score,
            total: self.total,
            percentage,
            band: Band::from_percentage(percentage),
            counts,
            records: self.records,
            started_at: self.started_at.unwrap_or(finished_at),
            finished_at,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn category(&self) -> LogCategory {
        self.category
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn records(&self) -> &[CheckRecord] {
        &self.records
    }
}
