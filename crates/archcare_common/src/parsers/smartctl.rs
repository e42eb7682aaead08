//! Parsers for `smartctl -H` and `smartctl -A`

use crate::error::ReadError;
use crate::states::SmartHealth;
use regex::Regex;
use std::sync::OnceLock;

fn nvme_temp() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^Temperature:\s+(\d+)\s+Celsius").expect("static regex"))
}

/// smartctl sets bit 0 for bad arguments and bit 1 when the device could
/// not be opened. Higher bits describe the disk and still come with output.
pub fn is_command_failure(exit_code: i32) -> bool {
    exit_code < 0 || exit_code & 0b11 != 0
}

/// Overall health from `smartctl -H`
pub fn health(raw: &str) -> Result<SmartHealth, ReadError> {
    for line in raw.lines() {
        // ATA: "SMART overall-health self-assessment test result: PASSED"
        // NVMe: "SMART Health Status: OK"
        if line.starts_with("SMART overall-health self-assessment test result:")
            || line.starts_with("SMART Health Status:")
        {
            if let Some((_, value)) = line.split_once(':') {
                return Ok(SmartHealth::parse(value));
            }
        }
    }

    Err(ReadError::parse("smartctl -H", "no health line"))
}

/// Drive temperature from `smartctl -A`
pub fn temperature(raw: &str) -> Result<f64, ReadError> {
    let mut airflow: Option<f64> = None;

    for line in raw.lines() {
        if let Some(caps) = nvme_temp().captures(line) {
            if let Ok(t) = caps[1].parse::<f64>() {
                return Ok(t);
            }
        }

        // ATA attribute table: ID NAME FLAG VALUE WORST THRESH TYPE UPDATED WHEN_FAILED RAW
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() >= 10 {
            let raw_value = fields[9]
                .split(|c: char| !c.is_ascii_digit())
                .next()
                .and_then(|s| s.parse::<f64>().ok());

            match (fields[1], raw_value) {
                ("Temperature_Celsius", Some(t)) => return Ok(t),
                ("Airflow_Temperature_Cel", Some(t)) => airflow = Some(t),
                _ => {}
            }
        }
    }

    airflow.ok_or_else(|| ReadError::parse("smartctl -A", "no temperature attribute"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATA_ATTRS: &str = "ID# ATTRIBUTE_NAME          FLAG     VALUE WORST THRESH TYPE      UPDATED  WHEN_FAILED RAW_VALUE
  5 Reallocated_Sector_Ct   0x0033   100   100   010    Pre-fail  Always       -       0
190 Airflow_Temperature_Cel 0x0032   064   045   000    Old_age   Always       -       36
194 Temperature_Celsius     0x0022   036   050   000    Old_age   Always       -       38 (Min/Max 20/50)
";

    const NVME_ATTRS: &str = "=== START OF SMART DATA SECTION ===
SMART/Health Information (NVMe Log 0x02)
Critical Warning:                   0x00
Temperature:                        41 Celsius
Available Spare:                    100%
";

    #[test]
    fn test_ata_prefers_temperature_celsius() {
        assert_eq!(temperature(ATA_ATTRS).unwrap(), 38.0);
    }

    #[test]
    fn test_nvme_temperature() {
        assert_eq!(temperature(NVME_ATTRS).unwrap(), 41.0);
    }

    #[test]
    fn test_health_ata_and_nvme() {
        let ata = "SMART overall-health self-assessment test result: PASSED\n";
        assert_eq!(health(ata).unwrap(), SmartHealth::Passed);

        let nvme = "=== START OF SMART DATA SECTION ===\nSMART Health Status: OK\n";
        assert_eq!(health(nvme).unwrap(), SmartHealth::Passed);

        let failing = "SMART overall-health self-assessment test result: FAILED!\n";
        assert_eq!(health(failing).unwrap(), SmartHealth::Failed);
    }

    #[test]
    fn test_missing_health_line() {
        assert!(health("Read Device Identity failed\n").is_err());
    }

    #[test]
    fn test_exit_code_bits() {
        assert!(!is_command_failure(0));
        assert!(is_command_failure(2));
        assert!(!is_command_failure(8)); // disk failing, output still valid
        assert!(!is_command_failure(64)); // error log has entries
    }
}
