//! Archcare configuration
//!
//! Flat `KEY=VALUE` file, `/etc/archcare/archcare.conf` by default.
//! Unknown keys are ignored, missing keys take the defaults below, and a
//! value that does not parse keeps its default with a warning.

use crate::error::ConfigError;
use crate::threshold::{Direction, ThresholdRule};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/archcare/archcare.conf";
pub const DEFAULT_LOG_DIR: &str = "/var/log/archcare";

/// Every numeric threshold the checks use
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleKey {
    CpuTemp,
    GpuTemp,
    DiskTemp,
    Memory,
    Swap,
    DiskUsage,
    Battery,
    FailedUnits,
    PendingUpdates,
    Orphans,
    CacheSize,
    JournalSize,
    Swappiness,
}

impl RuleKey {
    pub const ALL: [RuleKey; 13] = [
        RuleKey::CpuTemp,
        RuleKey::GpuTemp,
        RuleKey::DiskTemp,
        RuleKey::Memory,
        RuleKey::Swap,
        RuleKey::DiskUsage,
        RuleKey::Battery,
        RuleKey::FailedUnits,
        RuleKey::PendingUpdates,
        RuleKey::Orphans,
        RuleKey::CacheSize,
        RuleKey::JournalSize,
        RuleKey::Swappiness,
    ];

    /// Prefix of the `_WARN` / `_CRIT` config keys
    pub fn config_prefix(&self) -> &'static str {
        match self {
            RuleKey::CpuTemp => "CPU_TEMP",
            RuleKey::GpuTemp => "GPU_TEMP",
            RuleKey::DiskTemp => "DISK_TEMP",
            RuleKey::Memory => "MEMORY",
            RuleKey::Swap => "SWAP",
            RuleKey::DiskUsage => "DISK_USAGE",
            RuleKey::Battery => "BATTERY",
            RuleKey::FailedUnits => "FAILED_UNITS",
            RuleKey::PendingUpdates => "PENDING_UPDATES",
            RuleKey::Orphans => "ORPHANS",
            RuleKey::CacheSize => "CACHE_SIZE",
            RuleKey::JournalSize => "JOURNAL_SIZE",
            RuleKey::Swappiness => "SWAPPINESS",
        }
    }

    pub fn rule_name(&self) -> &'static str {
        match self {
            RuleKey::CpuTemp => "cpu-temperature",
            RuleKey::GpuTemp => "gpu-temperature",
            RuleKey::DiskTemp => "disk-temperature",
            RuleKey::Memory => "memory-usage",
            RuleKey::Swap => "swap-usage",
            RuleKey::DiskUsage => "disk-usage",
            RuleKey::Battery => "battery-capacity",
            RuleKey::FailedUnits => "failed-units",
            RuleKey::PendingUpdates => "pending-updates",
            RuleKey::Orphans => "orphan-packages",
            RuleKey::CacheSize => "package-cache-size",
            RuleKey::JournalSize => "journal-disk-usage",
            RuleKey::Swappiness => "swappiness",
        }
    }

    /// (warn, critical, direction)
    pub fn defaults(&self) -> (f64, f64, Direction) {
        use Direction::*;
        match self {
            RuleKey::CpuTemp => (70.0, 85.0, HigherIsWorse),
            RuleKey::GpuTemp => (75.0, 90.0, HigherIsWorse),
            RuleKey::DiskTemp => (45.0, 55.0, HigherIsWorse),
            RuleKey::Memory => (80.0, 90.0, HigherIsWorse),
            RuleKey::Swap => (50.0, 80.0, HigherIsWorse),
            RuleKey::DiskUsage => (80.0, 90.0, HigherIsWorse),
            RuleKey::Battery => (30.0, 15.0, LowerIsWorse),
            RuleKey::FailedUnits => (1.0, 3.0, HigherIsWorse),
            RuleKey::PendingUpdates => (1.0, 50.0, HigherIsWorse),
            RuleKey::Orphans => (1.0, 20.0, HigherIsWorse),
            RuleKey::CacheSize => (1024.0, 4096.0, HigherIsWorse),
            RuleKey::JournalSize => (500.0, 2000.0, HigherIsWorse),
            RuleKey::Swappiness => (61.0, 100.0, HigherIsWorse),
        }
    }

    fn default_rule(&self) -> ThresholdRule {
        let (warn, critical, direction) = self.defaults();
        ThresholdRule::from_parts(self.rule_name(), warn, critical, direction)
    }
}

/// Loaded configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    bounds: BTreeMap<RuleKey, (f64, f64)>,
    /// Package versions paccache keeps
    pub cache_keep_versions: u32,
    /// Journal vacuum age in days
    pub log_retention_days: u32,
    /// Reboot after an upgrade that replaced the running kernel
    pub auto_reboot: bool,
    pub enable_logging: bool,
    pub log_dir: PathBuf,
    /// Mount points checked for disk usage
    pub mounts: Vec<String>,
    /// vm.swappiness the performance tune sets
    pub target_swappiness: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bounds: BTreeMap::new(),
            cache_keep_versions: 3,
            log_retention_days: 30,
            auto_reboot: false,
            enable_logging: true,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            mounts: vec!["/".to_string()],
            target_swappiness: 10,
        }
    }
}

impl Config {
    /// Load from an explicit path (must be readable) or from the default
    /// location (silently absent is fine)
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Ok(Self::parse(&content))
            }
            None => match fs::read_to_string(DEFAULT_CONFIG_PATH) {
                Ok(content) => Ok(Self::parse(&content)),
                Err(e) => {
                    debug!("No config at {} ({}), using defaults", DEFAULT_CONFIG_PATH, e);
                    Ok(Self::default())
                }
            },
        }
    }

    /// Parse file content. Never fails: bad lines are skipped with a warning.
    pub fn parse(content: &str) -> Self {
        let mut config = Self::default();

        for (lineno, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                warn!("Config line {} has no '=', skipped", lineno + 1);
                continue;
            };
            let key = key.trim();
            let value = unquote(value.trim());

            config.apply(key, value);
        }

        config
    }

    fn apply(&mut self, key: &str, value: &str) {
        match key {
            "CACHE_KEEP_VERSIONS" => set_parsed(key, value, &mut self.cache_keep_versions),
            "LOG_RETENTION_DAYS" => set_parsed(key, value, &mut self.log_retention_days),
            "TARGET_SWAPPINESS" => set_parsed(key, value, &mut self.target_swappiness),
            "AUTO_REBOOT" => set_bool(key, value, &mut self.auto_reboot),
            "ENABLE_LOGGING" => set_bool(key, value, &mut self.enable_logging),
            "LOG_DIR" if !value.is_empty() => self.log_dir = PathBuf::from(value),
            "MOUNTS" => {
                let mounts: Vec<String> = value.split_whitespace().map(str::to_string).collect();
                if !mounts.is_empty() {
                    self.mounts = mounts;
                }
            }
            _ => {
                if !self.apply_bound(key, value) {
                    debug!("Ignoring unknown config key {}", key);
                }
            }
        }
    }

    /// `<PREFIX>_WARN` / `<PREFIX>_CRIT`
    fn apply_bound(&mut self, key: &str, value: &str) -> bool {
        for rule in RuleKey::ALL {
            let prefix = rule.config_prefix();
            let Some(suffix) = key.strip_prefix(prefix).and_then(|s| s.strip_prefix('_')) else {
                continue;
            };
            let is_warn = match suffix {
                "WARN" => true,
                "CRIT" => false,
                _ => continue,
            };

            let Ok(bound) = value.parse::<f64>() else {
                warn!("Config {}={:?} is not a number, keeping default", key, value);
                return true;
            };

            let (warn_default, crit_default, _) = rule.defaults();
            let entry = self
                .bounds
                .entry(rule)
                .or_insert((warn_default, crit_default));
            if is_warn {
                entry.0 = bound;
            } else {
                entry.1 = bound;
            }
            return true;
        }
        false
    }

    /// Rule for a key, falling back to the default when configured bounds
    /// break the rule invariant
    pub fn rule(&self, key: RuleKey) -> ThresholdRule {
        let Some(&(warn_bound, crit_bound)) = self.bounds.get(&key) else {
            return key.default_rule();
        };

        let (_, _, direction) = key.defaults();
        match ThresholdRule::new(key.rule_name(), warn_bound, crit_bound, direction) {
            Ok(rule) => rule,
            Err(e) => {
                warn!("{}; using default thresholds", e);
                key.default_rule()
            }
        }
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

fn set_parsed<T: std::str::FromStr>(key: &str, value: &str, target: &mut T) {
    match value.parse() {
        Ok(v) => *target = v,
        Err(_) => warn!("Config {}={:?} is not valid, keeping default", key, value),
    }
}

fn set_bool(key: &str, value: &str, target: &mut bool) {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => *target = true,
        "false" | "no" | "0" | "off" => *target = false,
        _ => warn!("Config {}={:?} is not a boolean, keeping default", key, value),
    }
}
