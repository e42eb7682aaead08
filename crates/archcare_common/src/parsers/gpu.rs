//! Parser for `nvidia-smi --query-gpu=temperature.gpu --format=csv,noheader,nounits`

use crate::error::ReadError;

/// Hottest GPU; one line per card
pub fn nvidia_temperature(raw: &str) -> Result<f64, ReadError> {
    let mut hottest: Option<f64> = None;

    for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let t: f64 = line
            .parse()
            .map_err(|_| ReadError::parse("nvidia-smi", format!("unexpected line: {:?}", line)))?;
        hottest = Some(hottest.map_or(t, |h| h.max(t)));
    }

    hottest.ok_or_else(|| ReadError::parse("nvidia-smi", "no GPU listed"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_gpu() {
        assert_eq!(nvidia_temperature("47\n").unwrap(), 47.0);
    }

    #[test]
    fn test_multi_gpu_takes_max() {
        assert_eq!(nvidia_temperature("47\n81\n").unwrap(), 81.0);
    }

    #[test]
    fn test_not_supported_is_parse_failure() {
        assert!(nvidia_temperature("[N/A]\n").is_err());
        assert!(nvidia_temperature("").is_err());
    }
}
