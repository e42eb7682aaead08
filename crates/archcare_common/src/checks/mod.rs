//! Check suites
//!
//! A check reads one or more metrics, classifies them, reports each line and
//! records the result into the session it is handed. Checks never abort a
//! scan: a failed read becomes an `unknown` record and the next check runs.
//! Citation: [archwiki:System_maintenance]

pub mod health;
pub mod maintenance;
pub mod performance;
pub mod security;

use crate::actions::{ActionOutcome, ActionRunner, MaintenanceAction};
use crate::config::Config;
use crate::error::{ReadError, SessionError};
use crate::log_file::LogCategory;
use crate::metric::{with_unit, Metric, MetricId, MetricValue};
use crate::probe::SystemProbe;
use crate::reader::MetricReader;
use crate::reporter::{Marker, Reporter};
use crate::session::{Band, CheckRecord, ScanSession, SessionSummary};
use crate::threshold::{Direction, ThresholdRule, VerdictTable};
use crate::verdict::{LogLevel, Verdict};
use tracing::{debug, info};

/// Everything a check needs besides the session
pub struct CheckContext<'a> {
    pub probe: &'a dyn SystemProbe,
    pub reporter: &'a Reporter,
    pub config: &'a Config,
    pub actions: &'a ActionRunner,
}

impl<'a> CheckContext<'a> {
    pub fn reader(&self) -> MetricReader<'a> {
        MetricReader::new(self.probe)
    }

    /// Run an action and record its outcome as informational
    pub fn act(
        &self,
        session: &mut ScanSession,
        action: &MaintenanceAction,
    ) -> Result<ActionOutcome, SessionError> {
        let outcome = self.actions.run(self.probe, self.reporter, action);
        session.record(outcome.record(action))?;
        Ok(outcome)
    }
}

/// One named unit of a suite
pub trait Check {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn citation(&self) -> &str;
    fn run(&self, ctx: &CheckContext<'_>, session: &mut ScanSession) -> Result<(), SessionError>;
}

/// Checks for a scan kind, in execution order
pub fn suite(category: LogCategory) -> Vec<Box<dyn Check>> {
    match category {
        LogCategory::Health => health::suite(),
        LogCategory::Security => security::suite(),
        LogCategory::Performance => performance::suite(),
        LogCategory::Update => maintenance::update_suite(),
        LogCategory::Clean => maintenance::clean_suite(),
    }
}

/// Run one complete scan: start a session, run every check of the suite,
/// finalize and report the score
pub fn run_scan(
    category: LogCategory,
    ctx: &CheckContext<'_>,
) -> Result<SessionSummary, SessionError> {
    let mut session = ScanSession::new(category);
    session.start()?;
    info!("Starting {} scan {}", category.as_str(), session.id());
    ctx.reporter
        .info(&format!("{} scan started", capitalize(category.as_str())));

    for check in suite(category) {
        debug!("Running check {}", check.name());
        ctx.reporter.detail(&format!(
            "{} - {} {}",
            check.name(),
            check.description(),
            check.citation()
        ));
        check.run(ctx, &mut session)?;
    }

    let summary = session.finalize()?;
    let (marker, level) = match summary.band {
        Band::Excellent | Band::Good => (Marker::Ok, LogLevel::Success),
        Band::Moderate => (Marker::Warn, LogLevel::Warning),
        Band::Poor => (Marker::Crit, LogLevel::Error),
    };
    ctx.reporter.event(
        marker,
        level,
        &format!(
            "{} score: {}/{} ({}%, {})",
            capitalize(category.as_str()),
            summary.score,
            summary.total,
            summary.percentage,
            summary.band.as_str()
        ),
    );

    Ok(summary)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Record a failed read as `unknown`. External failures also get an ERROR
/// line in the log.
pub(crate) fn record_unknown(
    ctx: &CheckContext<'_>,
    session: &mut ScanSession,
    name: &str,
    error: &ReadError,
) -> Result<Verdict, SessionError> {
    debug!("{} unreadable ({}): {}", name, error.kind(), error);
    let message = error.to_string();
    ctx.reporter.report(name, None, None, Verdict::Unknown, &message);
    if matches!(error, ReadError::ExternalFailure { .. }) {
        ctx.reporter
            .log(LogLevel::Error, &format!("{}: {}", name, message));
    }
    session.record(CheckRecord::new(name, Verdict::Unknown, message))?;
    Ok(Verdict::Unknown)
}

fn threshold_message(verdict: Verdict, rule: &ThresholdRule, unit: Option<&str>) -> String {
    let bound = |b: f64| with_unit(&MetricValue::Numeric(b), unit);
    let side = match rule.direction() {
        Direction::HigherIsWorse => "at or above",
        Direction::LowerIsWorse => "at or below",
    };
    match verdict {
        Verdict::Normal => String::new(),
        Verdict::Warning => format!("{} warning level {}", side, bound(rule.warn_bound())),
        Verdict::Critical => format!("{} critical level {}", side, bound(rule.critical_bound())),
        Verdict::Unknown => "not a usable reading".to_string(),
    }
}

/// Classify an already-read number, report it and record it
pub(crate) fn record_value(
    ctx: &CheckContext<'_>,
    session: &mut ScanSession,
    metric: Metric,
    rule: ThresholdRule,
) -> Result<Verdict, SessionError> {
    let verdict = metric
        .value
        .as_f64()
        .map(|v| rule.classify(v))
        .unwrap_or(Verdict::Unknown);
    let message = threshold_message(verdict, &rule, metric.unit.as_deref());

    ctx.reporter.report(
        &metric.name,
        Some(&metric.value),
        metric.unit.as_deref(),
        verdict,
        &message,
    );
    session.record(
        CheckRecord::new(metric.name.clone(), verdict, message)
            .with_metric(metric)
            .with_rule(rule),
    )?;
    Ok(verdict)
}

/// Read a numeric metric and classify it against `rule`
pub(crate) fn record_numeric(
    ctx: &CheckContext<'_>,
    session: &mut ScanSession,
    id: &MetricId,
    rule: ThresholdRule,
) -> Result<Verdict, SessionError> {
    match ctx.reader().read(id) {
        Ok(metric) => record_value(ctx, session, metric, rule),
        Err(e) => record_unknown(ctx, session, &id.name(), &e),
    }
}

/// Classify a categorical reading through a table. `advice` is shown when
/// the verdict is not normal.
pub(crate) fn record_categorical<K: PartialEq>(
    ctx: &CheckContext<'_>,
    session: &mut ScanSession,
    name: &str,
    read: Result<K, ReadError>,
    table: &VerdictTable<K>,
    label: fn(&K) -> &str,
    advice: &str,
) -> Result<Verdict, SessionError> {
    let value = match read {
        Ok(value) => value,
        Err(e) => return record_unknown(ctx, session, name, &e),
    };

    let verdict = table.classify(&value);
    let shown = label(&value).to_string();
    let message = match verdict {
        Verdict::Normal => String::new(),
        Verdict::Unknown => format!("unrecognized value for {}", table.name()),
        Verdict::Warning | Verdict::Critical => advice.to_string(),
    };

    ctx.reporter.report(
        name,
        Some(&MetricValue::Categorical(shown.clone())),
        None,
        verdict,
        &message,
    );
    session.record(
        CheckRecord::new(name, verdict, message).with_metric(Metric::categorical(name, shown)),
    )?;
    Ok(verdict)
}

/// Classify a numeric switch (sysctl mode) through a table of its modes.
/// Negative or fractional readings are not a mode and stay `unknown`.
pub(crate) fn record_mode(
    ctx: &CheckContext<'_>,
    session: &mut ScanSession,
    name: &str,
    read: Result<f64, ReadError>,
    table: &VerdictTable<u32>,
    advice: &str,
) -> Result<Verdict, SessionError> {
    let value = match read {
        Ok(value) => value,
        Err(e) => return record_unknown(ctx, session, name, &e),
    };

    let mode = (value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX))
        .then(|| value as u32);
    let verdict = mode
        .map(|m| table.classify(&m))
        .unwrap_or(Verdict::Unknown);
    let message = match verdict {
        Verdict::Normal => String::new(),
        Verdict::Unknown => format!("unrecognized value for {}", table.name()),
        Verdict::Warning | Verdict::Critical => advice.to_string(),
    };

    let metric = Metric::numeric(name, value, None);
    ctx.reporter
        .report(name, Some(&metric.value), None, verdict, &message);
    session.record(CheckRecord::new(name, verdict, message).with_metric(metric))?;
    Ok(verdict)
}
