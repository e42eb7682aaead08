//! One parser per external tool or file format
//!
//! Parsers are pure functions over captured text. They return
//! `ReadError::ParseFailure` when the text does not look like what the tool
//! documents, and never panic on odd input.

pub mod df;
pub mod gpu;
pub mod journal;
pub mod lsblk;
pub mod meminfo;
pub mod pacman;
pub mod sensors;
pub mod smartctl;
pub mod sshd;
pub mod systemctl;

use crate::error::ReadError;

/// Parse a single number such as a sysfs value or `sysctl -n` output.
/// Multi-field values (e.g. `kernel.printk`) yield their first field.
pub fn parse_number(source: &str, raw: &str) -> Result<f64, ReadError> {
    let first = raw
        .split_whitespace()
        .next()
        .ok_or_else(|| ReadError::parse(source, "empty output"))?;

    first
        .parse::<f64>()
        .map_err(|_| ReadError::parse(source, format!("not a number: {:?}", first)))
}

/// Convert a human size like `1.2G`, `512.0M` or `800B` into MiB (1024-based)
pub fn size_to_mib(source: &str, raw: &str) -> Result<f64, ReadError> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(raw.len());
    let (number, suffix) = raw.split_at(split);

    let value: f64 = number
        .parse()
        .map_err(|_| ReadError::parse(source, format!("bad size: {:?}", raw)))?;

    let factor = match suffix.trim().trim_end_matches("iB").trim_end_matches('B') {
        "" => 1.0 / (1024.0 * 1024.0),
        "K" => 1.0 / 1024.0,
        "M" => 1.0,
        "G" => 1024.0,
        "T" => 1024.0 * 1024.0,
        _ => return Err(ReadError::parse(source, format!("bad size unit: {:?}", raw))),
    };

    Ok(value * factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_first_field() {
        assert_eq!(parse_number("sysctl", "1\n").unwrap(), 1.0);
        assert_eq!(parse_number("sysctl", "4\t4\t1\t7\n").unwrap(), 4.0);
        assert!(parse_number("sysctl", "").is_err());
        assert!(parse_number("capacity", "Full\n").is_err());
    }

    #[test]
    fn test_size_to_mib() {
        assert_eq!(size_to_mib("journal", "1.5G").unwrap(), 1536.0);
        assert_eq!(size_to_mib("journal", "512.0M").unwrap(), 512.0);
        assert_eq!(size_to_mib("journal", "2048K").unwrap(), 2.0);
        assert_eq!(size_to_mib("journal", "1048576B").unwrap(), 1.0);
        assert!(size_to_mib("journal", "lots").is_err());
        assert!(size_to_mib("journal", "3P").is_err());
    }
}
