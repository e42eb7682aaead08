//! Parser for `df --output=pcent <mount>`

use crate::error::ReadError;

/// Use% of the single filesystem listed
pub fn used_percent(raw: &str) -> Result<f64, ReadError> {
    let mut lines = raw.lines().map(str::trim).filter(|l| !l.is_empty());

    match lines.next() {
        Some(header) if header.starts_with("Use%") => {}
        _ => return Err(ReadError::parse("df", "missing Use% header")),
    }

    let value = lines
        .next()
        .ok_or_else(|| ReadError::parse("df", "no filesystem row"))?;

    value
        .trim_end_matches('%')
        .parse::<f64>()
        .map_err(|_| ReadError::parse("df", format!("bad percentage: {:?}", value)))
}
