//! Threshold classification
//!
//! Numeric metrics are classified against a (warn, critical) pair whose
//! meaning depends on direction. Ties always resolve toward the worse
//! verdict. Categorical metrics go through an explicit `VerdictTable`;
//! anything missing from the table is `Unknown`.

use crate::error::ThresholdError;
use crate::verdict::Verdict;
use serde::{Deserialize, Serialize};

/// Which side of the scale is bad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Temperatures, usage percentages, counts
    HigherIsWorse,
    /// Battery charge, free space
    LowerIsWorse,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::HigherIsWorse => "higher-is-worse",
            Direction::LowerIsWorse => "lower-is-worse",
        }
    }
}

/// Named classification policy for a numeric metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRule {
    name: String,
    warn_bound: f64,
    critical_bound: f64,
    direction: Direction,
}

impl ThresholdRule {
    /// Build a rule, rejecting bounds that are negative, non-finite or
    /// not ordered for the given direction
    pub fn new(
        name: impl Into<String>,
        warn_bound: f64,
        critical_bound: f64,
        direction: Direction,
    ) -> Result<Self, ThresholdError> {
        let name = name.into();

        let bad_bound = |b: f64| !b.is_finite() || b < 0.0;
        if bad_bound(warn_bound) || bad_bound(critical_bound) {
            return Err(ThresholdError::InvalidBound {
                rule: name,
                warn: warn_bound,
                critical: critical_bound,
            });
        }

        let ordered = match direction {
            Direction::HigherIsWorse => warn_bound < critical_bound,
            Direction::LowerIsWorse => warn_bound > critical_bound,
        };
        if !ordered {
            return Err(ThresholdError::Misordered {
                rule: name,
                warn: warn_bound,
                critical: critical_bound,
                direction: direction.as_str(),
            });
        }

        Ok(Self {
            name,
            warn_bound,
            critical_bound,
            direction,
        })
    }

    /// Built-in defaults only; `config` tests check every one against `new`
    pub(crate) fn from_parts(
        name: &str,
        warn_bound: f64,
        critical_bound: f64,
        direction: Direction,
    ) -> Self {
        Self {
            name: name.to_string(),
            warn_bound,
            critical_bound,
            direction,
        }
    }

    pub fn higher_is_worse(name: &str, warn: f64, critical: f64) -> Result<Self, ThresholdError> {
        Self::new(name, warn, critical, Direction::HigherIsWorse)
    }

    pub fn lower_is_worse(name: &str, warn: f64, critical: f64) -> Result<Self, ThresholdError> {
        Self::new(name, warn, critical, Direction::LowerIsWorse)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn warn_bound(&self) -> f64 {
        self.warn_bound
    }

    pub fn critical_bound(&self) -> f64 {
        self.critical_bound
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn classify(&self, value: f64) -> Verdict {
        classify(value, self)
    }
}

/// Classify a numeric value against a rule.
///
/// Never returns `Unknown` for a finite value. NaN is not a reading and
/// classifies as `Unknown`.
pub fn classify(value: f64, rule: &ThresholdRule) -> Verdict {
    if value.is_nan() {
        return Verdict::Unknown;
    }

    match rule.direction {
        Direction::HigherIsWorse => {
            if value >= rule.critical_bound {
                Verdict::Critical
            } else if value >= rule.warn_bound {
                Verdict::Warning
            } else {
                Verdict::Normal
            }
        }
        Direction::LowerIsWorse => {
            if value <= rule.critical_bound {
                Verdict::Critical
            } else if value <= rule.warn_bound {
                Verdict::Warning
            } else {
                Verdict::Normal
            }
        }
    }
}

/// Explicit value -> verdict mapping for categorical metrics
#[derive(Debug, Clone)]
pub struct VerdictTable<K> {
    name: String,
    entries: Vec<(K, Verdict)>,
}

impl<K: PartialEq> VerdictTable<K> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Add a mapping. A later entry for the same key replaces the earlier one.
    pub fn with(mut self, key: K, verdict: Verdict) -> Self {
        self.entries.retain(|(k, _)| *k != key);
        self.entries.push((key, verdict));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a value; absent values are `Unknown`
    pub fn classify(&self, key: &K) -> Verdict {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
            .unwrap_or(Verdict::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpu_rule() -> ThresholdRule {
        ThresholdRule::higher_is_worse("cpu-temperature", 70.0, 85.0).unwrap()
    }

    fn battery_rule() -> ThresholdRule {
        ThresholdRule::lower_is_worse("battery-capacity", 30.0, 15.0).unwrap()
    }

    #[test]
    fn test_cpu_72_is_warning() {
        assert_eq!(classify(72.0, &cpu_rule()), Verdict::Warning);
    }

    #[test]
    fn test_battery_10_is_critical() {
        assert_eq!(classify(10.0, &battery_rule()), Verdict::Critical);
    }

    #[test]
    fn test_higher_is_worse_boundaries() {
        let rule = cpu_rule();
        assert_eq!(rule.classify(85.0), Verdict::Critical);
        assert_eq!(rule.classify(70.0), Verdict::Warning);
        assert_eq!(rule.classify(84.999), Verdict::Warning);
        for eps in [0.001, 0.5, 1.0, 14.9] {
            assert_eq!(rule.classify(70.0 - eps), Verdict::Normal);
        }
    }

    #[test]
    fn test_lower_is_worse_boundaries() {
        let rule = battery_rule();
        assert_eq!(rule.classify(15.0), Verdict::Critical);
        assert_eq!(rule.classify(30.0), Verdict::Warning);
        assert_eq!(rule.classify(15.001), Verdict::Warning);
        for eps in [0.001, 0.5, 1.0, 14.9] {
            assert_eq!(rule.classify(30.0 + eps), Verdict::Normal);
        }
    }

    #[test]
    fn test_numeric_input_never_unknown() {
        let rule = cpu_rule();
        for v in [0.0, 1e-9, 69.0, 70.0, 85.0, 1e9, f64::INFINITY] {
            assert_ne!(rule.classify(v), Verdict::Unknown);
        }
        assert_eq!(rule.classify(f64::NAN), Verdict::Unknown);
    }

    #[test]
    fn test_rule_rejects_misordered_bounds() {
        assert!(matches!(
            ThresholdRule::higher_is_worse("x", 90.0, 80.0),
            Err(ThresholdError::Misordered { .. })
        ));
        assert!(matches!(
            ThresholdRule::lower_is_worse("x", 15.0, 30.0),
            Err(ThresholdError::Misordered { .. })
        ));
        assert!(ThresholdRule::higher_is_worse("x", 50.0, 50.0).is_err());
    }

    #[test]
    fn test_rule_rejects_negative_and_nan() {
        assert!(matches!(
            ThresholdRule::higher_is_worse("x", -1.0, 5.0),
            Err(ThresholdError::InvalidBound { .. })
        ));
        assert!(ThresholdRule::higher_is_worse("x", f64::NAN, 5.0).is_err());
    }

    #[derive(Debug, PartialEq)]
    enum Health {
        Passed,
        Failed,
        Unrecognized(String),
    }

    #[test]
    fn test_table_absent_value_is_unknown() {
        let table = VerdictTable::new("smart")
            .with(Health::Passed, Verdict::Normal)
            .with(Health::Failed, Verdict::Critical);

        assert_eq!(table.classify(&Health::Passed), Verdict::Normal);
        assert_eq!(table.classify(&Health::Failed), Verdict::Critical);
        assert_eq!(
            table.classify(&Health::Unrecognized("DEGRADED".into())),
            Verdict::Unknown
        );
    }

    #[test]
    fn test_table_later_entry_wins() {
        let table = VerdictTable::new("t")
            .with("yes", Verdict::Warning)
            .with("yes", Verdict::Critical);
        assert_eq!(table.classify(&"yes"), Verdict::Critical);
    }
}
