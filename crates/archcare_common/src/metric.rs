//! Metric observations and the identifiers readers accept

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Observed value of a metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Numeric(f64),
    Categorical(String),
}

impl MetricValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Numeric(v) => Some(*v),
            MetricValue::Categorical(_) => None,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Integral readings (counts, percentages from df) print without decimals
            MetricValue::Numeric(v) if v.fract() == 0.0 => write!(f, "{}", *v as i64),
            MetricValue::Numeric(v) => write!(f, "{:.1}", v),
            MetricValue::Categorical(s) => f.write_str(s),
        }
    }
}

/// A single named observation, immutable once captured
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub value: MetricValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub captured_at: DateTime<Utc>,
}

impl Metric {
    pub fn numeric(name: impl Into<String>, value: f64, unit: Option<&str>) -> Self {
        Self {
            name: name.into(),
            value: MetricValue::Numeric(value),
            unit: unit.map(str::to_string),
            captured_at: Utc::now(),
        }
    }

    pub fn categorical(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: MetricValue::Categorical(value.into()),
            unit: None,
            captured_at: Utc::now(),
        }
    }

    pub fn display_value(&self) -> String {
        with_unit(&self.value, self.unit.as_deref())
    }
}

/// Value with unit, e.g. "72.5°C", "66%" or "1536 MiB"
pub fn with_unit(value: &MetricValue, unit: Option<&str>) -> String {
    match unit {
        Some(unit) if unit.starts_with(char::is_alphabetic) => format!("{} {}", value, unit),
        Some(unit) => format!("{}{}", value, unit),
        None => value.to_string(),
    }
}

/// Which metric to read. Each variant has exactly one source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetricId {
    CpuTemperature,
    GpuTemperature,
    DiskTemperature(String),
    DiskHealth(String),
    MemoryUsage,
    SwapUsage,
    DiskUsage(String),
    BatteryCapacity,
    PendingUpdates,
    OrphanPackages,
    PackageCacheSize,
    JournalDiskUsage,
    FailedUnits,
    SshRootLogin,
    SshPasswordAuth,
    Firewall,
    KernelParam(String),
    CpuGovernor,
    Swappiness,
    FstrimTimer,
}

impl MetricId {
    /// Name used in report and log lines
    pub fn name(&self) -> String {
        match self {
            MetricId::CpuTemperature => "cpu-temperature".to_string(),
            MetricId::GpuTemperature => "gpu-temperature".to_string(),
            MetricId::DiskTemperature(dev) => format!("disk-temperature:{}", dev),
            MetricId::DiskHealth(dev) => format!("disk-health:{}", dev),
            MetricId::MemoryUsage => "memory-usage".to_string(),
            MetricId::SwapUsage => "swap-usage".to_string(),
            MetricId::DiskUsage(mount) => format!("disk-usage:{}", mount),
            MetricId::BatteryCapacity => "battery-capacity".to_string(),
            MetricId::PendingUpdates => "pending-updates".to_string(),
            MetricId::OrphanPackages => "orphan-packages".to_string(),
            MetricId::PackageCacheSize => "package-cache-size".to_string(),
            MetricId::JournalDiskUsage => "journal-disk-usage".to_string(),
            MetricId::FailedUnits => "failed-units".to_string(),
            MetricId::SshRootLogin => "ssh-root-login".to_string(),
            MetricId::SshPasswordAuth => "ssh-password-auth".to_string(),
            MetricId::Firewall => "firewall".to_string(),
            MetricId::KernelParam(key) => format!("sysctl:{}", key),
            MetricId::CpuGovernor => "cpu-governor".to_string(),
            MetricId::Swappiness => "swappiness".to_string(),
            MetricId::FstrimTimer => "fstrim-timer".to_string(),
        }
    }
}
