//! Parser for /proc/meminfo

use crate::error::ReadError;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn kv_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([^:]+):\s*(\d+)\s*(kB)?$").expect("static regex"))
}

/// The fields the usage checks need, in kB
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemInfo {
    pub mem_total_kb: u64,
    pub mem_available_kb: u64,
    pub swap_total_kb: u64,
    pub swap_free_kb: u64,
}

impl MemInfo {
    /// Used RAM as a percentage of total (total minus available)
    pub fn mem_percent(&self) -> f64 {
        let used = self.mem_total_kb.saturating_sub(self.mem_available_kb);
        round1(used as f64 / self.mem_total_kb as f64 * 100.0)
    }

    /// Used swap percentage; no swap configured counts as 0%
    pub fn swap_percent(&self) -> f64 {
        if self.swap_total_kb == 0 {
            return 0.0;
        }
        let used = self.swap_total_kb.saturating_sub(self.swap_free_kb);
        round1(used as f64 / self.swap_total_kb as f64 * 100.0)
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

pub fn parse(raw: &str) -> Result<MemInfo, ReadError> {
    let mut values: HashMap<&str, u64> = HashMap::new();

    for line in raw.lines() {
        if let Some(caps) = kv_line().captures(line) {
            let key = caps.get(1).map_or("", |m| m.as_str().trim());
            if let Some(value) = caps.get(2).and_then(|m| m.as_str().parse().ok()) {
                values.insert(key, value);
            }
        }
    }

    let mem_total_kb = match values.get("MemTotal") {
        Some(&v) if v > 0 => v,
        _ => return Err(ReadError::parse("/proc/meminfo", "missing MemTotal")),
    };
    let mem_available_kb = values
        .get("MemAvailable")
        .copied()
        .ok_or_else(|| ReadError::parse("/proc/meminfo", "missing MemAvailable"))?;

    Ok(MemInfo {
        mem_total_kb,
        mem_available_kb,
        swap_total_kb: values.get("SwapTotal").copied().unwrap_or(0),
        swap_free_kb: values.get("SwapFree").copied().unwrap_or(0),
    })
}
