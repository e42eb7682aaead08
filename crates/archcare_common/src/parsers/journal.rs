//! Parser for `journalctl --disk-usage`

use super::size_to_mib;
use crate::error::ReadError;
use regex::Regex;
use std::sync::OnceLock;

fn usage_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"take up ([0-9.]+[KMGTB]?)").expect("static regex"))
}

/// "Archived and active journals take up 1.2G in the file system."
pub fn disk_usage_mib(raw: &str) -> Result<f64, ReadError> {
    let caps = usage_line()
        .captures(raw)
        .ok_or_else(|| ReadError::parse("journalctl --disk-usage", "no usage sentence"))?;

    size_to_mib("journalctl --disk-usage", &caps[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_usage() {
        let raw = "Archived and active journals take up 1.5G in the file system.\n";
        assert_eq!(disk_usage_mib(raw).unwrap(), 1536.0);

        let raw = "Archived and active journals take up 56.0M in the file system.\n";
        assert_eq!(disk_usage_mib(raw).unwrap(), 56.0);
    }

    #[test]
    fn test_disk_usage_bad_output() {
        assert!(disk_usage_mib("No journal files were found.\n").is_err());
    }
}
