//! Parsers for pacman-family output: `checkupdates`, `pacman -Qdtq`, `du -sb`

use crate::error::ReadError;

/// One pending upgrade from `checkupdates`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpdate {
    pub name: String,
    pub current: String,
    pub available: String,
}

/// `name old -> new` per line
pub fn pending_updates(raw: &str) -> Result<Vec<PendingUpdate>, ReadError> {
    raw.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts.as_slice() {
                [name, current, "->", available, ..] => Ok(PendingUpdate {
                    name: name.to_string(),
                    current: current.to_string(),
                    available: available.to_string(),
                }),
                _ => Err(ReadError::parse(
                    "checkupdates",
                    format!("unexpected line: {:?}", line),
                )),
            }
        })
        .collect()
}

/// Package names, one per line (`pacman -Qdtq`)
pub fn package_names(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// `du -sb <dir>` prints `<bytes>\t<dir>`; returns MiB
pub fn du_mib(raw: &str) -> Result<f64, ReadError> {
    let bytes: u64 = raw
        .split_whitespace()
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ReadError::parse("du", format!("unexpected output: {:?}", raw.trim())))?;

    Ok(((bytes as f64 / (1024.0 * 1024.0)) * 10.0).round() / 10.0)
}
