//! Parser for lm_sensors `sensors` output

use crate::error::ReadError;
use regex::Regex;
use std::sync::OnceLock;

fn temp_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([^:]+):\s+([+-]?\d+(?:\.\d+)?)\s*°C").expect("static regex")
    })
}

/// A labelled temperature within one chip block
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub chip: String,
    pub label: String,
    pub celsius: f64,
}

/// Split `sensors` output into (chip, label, temperature) readings
pub fn readings(raw: &str) -> Vec<Reading> {
    let mut chip = String::new();
    let mut out = Vec::new();

    for line in raw.lines() {
        if line.trim().is_empty() {
            chip.clear();
            continue;
        }
        // Chip headers are the first line of a block and carry no colon
        if chip.is_empty() && !line.contains(':') {
            chip = line.trim().to_string();
            continue;
        }
        if let Some(caps) = temp_line().captures(line) {
            if let Ok(celsius) = caps[2].parse::<f64>() {
                out.push(Reading {
                    chip: chip.clone(),
                    label: caps[1].trim().to_string(),
                    celsius,
                });
            }
        }
    }

    out
}

fn is_cpu_label(label: &str) -> bool {
    label.starts_with("Package id")
        || label.starts_with("Core ")
        || label == "Tctl"
        || label == "Tdie"
}

/// Hottest CPU package/core temperature (Intel coretemp or AMD k10temp)
pub fn cpu_temperature(raw: &str) -> Result<f64, ReadError> {
    readings(raw)
        .into_iter()
        .filter(|r| is_cpu_label(&r.label))
        .map(|r| r.celsius)
        .fold(None, |acc: Option<f64>, t| Some(acc.map_or(t, |a| a.max(t))))
        .ok_or_else(|| ReadError::parse("sensors", "no CPU temperature reading"))
}

/// GPU edge temperature from amdgpu/radeon/nouveau chips
pub fn gpu_temperature(raw: &str) -> Result<f64, ReadError> {
    readings(raw)
        .into_iter()
        .filter(|r| {
            let gpu_chip = r.chip.starts_with("amdgpu")
                || r.chip.starts_with("radeon")
                || r.chip.starts_with("nouveau");
            gpu_chip && (r.label == "edge" || r.label == "temp1")
        })
        .map(|r| r.celsius)
        .fold(None, |acc: Option<f64>, t| Some(acc.map_or(t, |a| a.max(t))))
        .ok_or_else(|| ReadError::parse("sensors", "no GPU temperature reading"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTEL: &str = "coretemp-isa-0000
Adapter: ISA adapter
Package id 0:  +45.0°C  (high = +80.0°C, crit = +100.0°C)
Core 0:        +42.0°C  (high = +80.0°C, crit = +100.0°C)
Core 1:        +72.0°C  (high = +80.0°C, crit = +100.0°C)

acpitz-acpi-0
Adapter: ACPI interface
temp1:        +27.8°C  (crit = +105.0°C)
";

    const AMD: &str = "k10temp-pci-00c3
Adapter: PCI adapter
Tctl:         +49.8°C

amdgpu-pci-0300
Adapter: PCI adapter
vddgfx:        1.01 V
edge:         +58.0°C  (crit = +100.0°C, hyst = -273.1°C)
junction:     +61.0°C  (crit = +110.0°C, hyst = -273.1°C)
";

    #[test]
    fn test_intel_cpu_takes_hottest_core() {
        assert_eq!(cpu_temperature(INTEL).unwrap(), 72.0);
    }

    #[test]
    fn test_amd_cpu_and_gpu() {
        assert_eq!(cpu_temperature(AMD).unwrap(), 49.8);
        assert_eq!(gpu_temperature(AMD).unwrap(), 58.0);
    }

    #[test]
    fn test_acpi_temp1_is_not_a_gpu() {
        assert!(gpu_temperature(INTEL).is_err());
    }

    #[test]
    fn test_empty_output_is_parse_failure() {
        assert!(matches!(
            cpu_temperature(""),
            Err(ReadError::ParseFailure { .. })
        ));
    }

    #[test]
    fn test_readings_track_chip() {
        let r = readings(AMD);
        assert_eq!(r[0].chip, "k10temp-pci-00c3");
        assert_eq!(r[1].chip, "amdgpu-pci-0300");
        assert_eq!(r[1].label, "edge");
    }
}
